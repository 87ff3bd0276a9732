use std::path::PathBuf;

/// Single-line text entry for the "open file" prompt
#[derive(Debug, Clone, Default)]
pub struct PathInput {
    buffer: String,
}

impl PathInput {
    pub fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Take the entered path, stripping whitespace and surrounding quotes
    /// that terminals add when a file is dropped in.
    pub fn take_path(&mut self) -> Option<PathBuf> {
        let text = std::mem::take(&mut self.buffer);
        let trimmed = text.trim().trim_matches(|c| c == '"' || c == '\'');
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}
