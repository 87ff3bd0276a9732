//! Plain-text table output for non-TUI mode.

use crate::core::{Column, OutputRow};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render rows as an aligned table with the fixed column headers.
pub fn render_table<'a, I>(rows: I, color: bool) -> String
where
    I: IntoIterator<Item = &'a OutputRow>,
{
    let rows: Vec<&OutputRow> = rows.into_iter().collect();

    let widths: Vec<usize> = Column::ALL
        .iter()
        .map(|column| {
            rows.iter()
                .map(|row| row.get(*column).chars().count())
                .chain(std::iter::once(column.header().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();

    let header = format_line(Column::ALL.iter().map(|c| c.header()), &widths);
    if color {
        out.push_str(BOLD);
        out.push_str(&header);
        out.push_str(RESET);
    } else {
        out.push_str(&header);
    }
    out.push('\n');

    for row in rows {
        out.push_str(&format_line(row.values().iter().map(String::as_str), &widths));
        out.push('\n');
    }

    out
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::core::rows_from_str;

    #[test]
    fn test_render_aligns_columns() {
        let rows = rows_from_str(
            r#"[{"sts":"IN","name":"Alice","sftno":"1"},{"stn":"5","uid":"U1"},{"stn":"12","uid":"U22"}]"#,
            &SchemaConfig::default(),
        )
        .unwrap();

        let out = render_table(&rows, false);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Station No  User ID  User Name  Shift No"));
        assert!(lines[0].ends_with("Job"));
        assert!(lines[1].starts_with("5           U1       Alice      1"));
        assert!(lines[2].starts_with("12          U22      Alice      1"));
    }

    #[test]
    fn test_render_header_only_when_empty() {
        let out = render_table(std::iter::empty(), true);
        assert!(out.starts_with(BOLD));
        assert_eq!(out.lines().count(), 1);
    }
}
