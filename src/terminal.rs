use heapless::{String, Vec};

/// Maximum length of an input line
pub const LINE_MAX: usize = 80;

/// An input line, bounded at [`LINE_MAX`] characters
pub type Line = String<LINE_MAX>;

/// Key codes for special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Backspace,
    Enter,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    CtrlC,
    CtrlD,
    Char(u8),
}

/// Keys decoded from one input byte: none, one, or a cancelled `Escape`
/// followed by the key the byte stands for
pub type Keys = Vec<KeyCode, 2>;

/// Trailing bytes of two-byte extended key sequences (lead byte above 127),
/// as produced by native console getch
pub static EXTENDED_KEYS: [(u8, KeyCode); 4] = [
    (b'H', KeyCode::ArrowUp),
    (b'P', KeyCode::ArrowDown),
    (b'K', KeyCode::ArrowLeft),
    (b'M', KeyCode::ArrowRight),
];

/// Final bytes of `ESC [` cursor sequences, as produced by POSIX terminals
pub static CSI_KEYS: [(u8, KeyCode); 4] = [
    (b'A', KeyCode::ArrowUp),
    (b'B', KeyCode::ArrowDown),
    (b'C', KeyCode::ArrowRight),
    (b'D', KeyCode::ArrowLeft),
];

fn lookup(table: &[(u8, KeyCode)], byte: u8) -> Option<KeyCode> {
    table.iter().find(|(b, _)| *b == byte).map(|(_, key)| *key)
}

/// Only letters, digits and `_` `.` `/` space may be typed into a line
pub fn is_valid_input(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'/' | b' ')
}

/// State machine for multi-byte key sequences
#[derive(Debug, Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,
    Bracket,
    Extended,
}

/// Line buffer and key decoder
#[derive(Debug)]
pub struct Terminal<const BUF_SIZE: usize> {
    buffer: String<BUF_SIZE>,
    escape_state: EscapeState,
}

impl<const BUF_SIZE: usize> Default for Terminal<BUF_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUF_SIZE: usize> Terminal<BUF_SIZE> {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            escape_state: EscapeState::Normal,
        }
    }

    /// Get the current buffer as a string slice
    pub fn buffer_str(&self) -> &str {
        &self.buffer
    }

    /// Clear the buffer and forget any partial key sequence
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.escape_state = EscapeState::Normal;
    }

    /// Process a single byte of input, handling escape sequences.
    ///
    /// A byte that cannot continue an `ESC` sequence yields `Escape` and is
    /// then decoded on its own, so the key after a lone Esc is not lost.
    pub fn process_byte(&mut self, byte: u8) -> Keys {
        let mut keys = Keys::new();
        if self.escape_state == EscapeState::Escape && byte != b'[' {
            self.escape_state = EscapeState::Normal;
            // Capacity 2 covers Escape plus one decoded key.
            let _ = keys.push(KeyCode::Escape);
        }
        if let Some(key) = self.decode(byte) {
            let _ = keys.push(key);
        }
        keys
    }

    fn decode(&mut self, byte: u8) -> Option<KeyCode> {
        match self.escape_state {
            EscapeState::Normal => match byte {
                b'\r' | b'\n' => Some(KeyCode::Enter),
                0x08 | 0x7F => Some(KeyCode::Backspace),
                0x03 => Some(KeyCode::CtrlC),
                0x04 => Some(KeyCode::CtrlD),
                0x09 => Some(KeyCode::Tab),
                0x1B => {
                    self.escape_state = EscapeState::Escape;
                    None
                }
                0x80.. => {
                    self.escape_state = EscapeState::Extended;
                    None
                }
                0x20..=0x7E => Some(KeyCode::Char(byte)),
                _ => None,
            },
            // Only `[` reaches here, see `process_byte`.
            EscapeState::Escape => {
                self.escape_state = EscapeState::Bracket;
                None
            }
            EscapeState::Bracket => {
                self.escape_state = EscapeState::Normal;
                lookup(&CSI_KEYS, byte)
            }
            EscapeState::Extended => {
                self.escape_state = EscapeState::Normal;
                lookup(&EXTENDED_KEYS, byte)
            }
        }
    }

    /// Handle a key press against the line buffer
    pub fn handle_key(&mut self, key: KeyCode) -> TerminalEvent {
        match key {
            KeyCode::Enter => {
                if self.buffer.is_empty() {
                    TerminalEvent::EmptyCommand
                } else {
                    TerminalEvent::CommandReady
                }
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    TerminalEvent::Erased
                } else {
                    TerminalEvent::None
                }
            }
            KeyCode::Tab => TerminalEvent::CompletionRequested,
            KeyCode::ArrowUp => TerminalEvent::HistoryPrevious,
            KeyCode::ArrowDown => TerminalEvent::HistoryNext,
            KeyCode::CtrlC => TerminalEvent::Interrupt,
            KeyCode::CtrlD => TerminalEvent::ModeSwitch,
            KeyCode::Char(byte) if is_valid_input(byte) => {
                if self.buffer.push(char::from(byte)).is_ok() {
                    TerminalEvent::Inserted(byte)
                } else {
                    TerminalEvent::BufferFull
                }
            }
            _ => TerminalEvent::None,
        }
    }

    /// Append as much of `text` as fits, returning the part that was appended
    pub fn append<'t>(&mut self, text: &'t str) -> &'t str {
        let room = BUF_SIZE - self.buffer.len();
        let mut end = text.len().min(room);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let appended = &text[..end];
        // Cannot fail: `appended` fits in the remaining capacity.
        let _ = self.buffer.push_str(appended);
        appended
    }

    /// Get the current line and clear the buffer
    pub fn take_command(&mut self) -> String<BUF_SIZE> {
        let result = self.buffer.clone();
        self.clear_buffer();
        result
    }

    /// Set the buffer content (useful for history navigation).
    ///
    /// Content longer than the buffer is truncated.
    pub fn set_buffer(&mut self, content: &str) {
        self.buffer.clear();
        self.append(content);
    }
}

/// Events that can occur while editing a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalEvent {
    None,
    Inserted(u8),
    Erased,
    CommandReady,
    EmptyCommand,
    BufferFull,
    CompletionRequested,
    Interrupt,
    ModeSwitch,
    HistoryPrevious,
    HistoryNext,
}
