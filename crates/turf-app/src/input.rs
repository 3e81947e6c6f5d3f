//! Terminal-agnostic keyboard input and the line editor.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries so key handling can
/// be driven from tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (send or run command).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (cycle rooms).
    Tab,
    /// Escape key (quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key (scroll up one row).
    Up,
    /// Down arrow key (scroll down one row).
    Down,
    /// Page Up key (scroll up one page).
    PageUp,
    /// Page Down key (scroll down one page).
    PageDown,
    /// Home key (cursor to start).
    Home,
    /// End key (jump to newest message).
    End,
}

/// Single-line text editor.
///
/// The cursor is a character index, so multi-byte input edits correctly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert `c` at the cursor.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.buffer.remove(at);
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.buffer.remove(at);
        }
    }

    /// Move the cursor one character left.
    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one character right.
    pub fn right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move the cursor to the start.
    pub fn home(&mut self) {
        self.cursor = 0;
    }

    /// Empty the editor.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        text.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn typing_appends() {
        let input = typed("hi");
        assert_eq!(input.buffer(), "hi");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = typed("ab");
        input.backspace();
        assert_eq!(input.buffer(), "a");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn multibyte_editing() {
        let mut input = typed("héllo");
        input.home();
        input.right();
        input.delete();
        assert_eq!(input.buffer(), "hllo");

        input.insert('é');
        assert_eq!(input.buffer(), "héllo");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn cursor_is_clamped() {
        let mut input = typed("abc");
        input.right();
        assert_eq!(input.cursor(), 3);

        input.home();
        input.left();
        assert_eq!(input.cursor(), 0);
        input.backspace();
        assert_eq!(input.buffer(), "abc");
    }
}
