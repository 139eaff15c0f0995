//! Single-line text field.

use crate::script::single_line;
use unicode_width::UnicodeWidthStr;

/// Editable single-line text with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// Current text.
    pub text: String,
    /// Cursor position (byte offset).
    pub cursor: usize,
}

impl InputState {
    /// Empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field pre-filled with `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = single_line(&text.into());
        let cursor = text.len();
        Self { text, cursor }
    }

    /// Insert a character at the cursor. Line breaks become spaces.
    pub fn insert(&mut self, ch: char) {
        let ch = if ch == '\n' || ch == '\r' { ' ' } else { ch };
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Insert pasted text, folding line breaks into single spaces.
    pub fn insert_str(&mut self, pasted: &str) {
        let cleaned = single_line(pasted);
        self.text.insert_str(self.cursor, &cleaned);
        self.cursor += cleaned.len();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    /// Move one character left.
    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    /// Move one character right.
    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Jump to the start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Jump to the end.
    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Clear the field.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Terminal column of the cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].width()
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
