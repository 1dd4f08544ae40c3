use std::collections::VecDeque;

use heapless::String;

/// Command history manager.
///
/// Accepted lines are kept for the life of the session, oldest first.
#[derive(Debug, Default)]
pub struct History<const BUF_SIZE: usize> {
    entries: VecDeque<String<BUF_SIZE>>,
    current_index: Option<usize>,
}

impl<const BUF_SIZE: usize> History<BUF_SIZE> {
    /// Create a new history manager
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            current_index: None,
        }
    }

    /// Add a command to history.
    ///
    /// Returns `false` when the line was not stored: it was empty, equal to the
    /// most recent entry, or longer than `BUF_SIZE`.
    pub fn add(&mut self, command: &str) -> bool {
        if command.is_empty() {
            return false;
        }

        if self.entries.back().is_some_and(|last| last == command) {
            return false;
        }

        let Ok(entry) = String::try_from(command) else {
            return false;
        };

        self.entries.push_back(entry);
        self.current_index = None;
        true
    }

    /// Get the entry at `index` (0 is the oldest), or `None` when out of range
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|s| s.as_str())
    }

    /// Step back to the previous (older) command in history
    pub fn previous(&mut self) -> Option<&str> {
        let new_index = match self.current_index {
            None => self.entries.len().checked_sub(1)?,
            Some(0) => 0,
            Some(i) => i - 1,
        };

        self.current_index = Some(new_index);
        self.get(new_index)
    }

    /// Step forward to the next (newer) command in history.
    ///
    /// Returns `None` once navigation moves past the newest entry.
    pub fn next(&mut self) -> Option<&str> {
        let i = self.current_index?;
        if i + 1 >= self.entries.len() {
            self.current_index = None;
            return None;
        }
        self.current_index = Some(i + 1);
        self.get(i + 1)
    }

    /// Reset the history navigation position
    pub fn reset_position(&mut self) {
        self.current_index = None;
    }

    /// Whether navigation currently points at a stored entry
    pub fn is_navigating(&self) -> bool {
        self.current_index.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
