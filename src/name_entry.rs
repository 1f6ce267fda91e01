//! Player name entry overlay
//!
//! Arcade mode takes exactly three letters, upper-cased. Free mode takes any
//! printable text up to a length limit.

/// Letters in an arcade name
pub const ARCADE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Arcade,
    Free { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    mode: Mode,
    text: String,
}

impl NameEntry {
    /// Three-letter A-Z entry
    pub fn arcade() -> Self {
        Self {
            mode: Mode::Arcade,
            text: String::new(),
        }
    }

    /// Free-form entry of at most `max` characters
    pub fn free(max: usize) -> Self {
        Self {
            mode: Mode::Free { max },
            text: String::new(),
        }
    }

    fn max_len(&self) -> usize {
        match self.mode {
            Mode::Arcade => ARCADE_LEN,
            Mode::Free { max } => max,
        }
    }

    /// Append a character; false when it was rejected
    pub fn push(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= self.max_len() {
            return false;
        }
        match self.mode {
            Mode::Arcade => {
                if !ch.is_ascii_alphabetic() {
                    return false;
                }
                self.text.push(ch.to_ascii_uppercase());
            }
            Mode::Free { .. } => {
                if ch.is_control() {
                    return false;
                }
                self.text.push(ch);
            }
        }
        true
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn can_accept(&self) -> bool {
        match self.mode {
            Mode::Arcade => self.text.chars().count() == ARCADE_LEN,
            Mode::Free { .. } => !self.text.trim().is_empty(),
        }
    }

    /// The finished name, or None if it is not acceptable yet
    pub fn accept(&self) -> Option<String> {
        if !self.can_accept() {
            return None;
        }
        Some(match self.mode {
            Mode::Arcade => self.text.clone(),
            Mode::Free { .. } => self.text.trim().to_string(),
        })
    }

    /// Text as shown on screen
    pub fn display(&self) -> String {
        match self.mode {
            Mode::Arcade => {
                let blanks = ARCADE_LEN - self.text.chars().count();
                format!("{}{}", self.text, "_".repeat(blanks))
            }
            Mode::Free { .. } => format!("{}_", self.text),
        }
    }

    pub fn is_arcade(&self) -> bool {
        self.mode == Mode::Arcade
    }
}
