//! Bounded recent-input history, newest first.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct InputHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl InputHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Record an input. Blank input and repeats of the newest entry are skipped.
    pub fn push(&mut self, input: &str) {
        if input.trim().is_empty() || self.capacity == 0 {
            return;
        }
        if self.entries.front().is_some_and(|newest| newest == input) {
            return;
        }
        self.entries.push_front(input.to_string());
        self.entries.truncate(self.capacity);
    }

    /// Entry `index` steps back from the newest.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let mut history = InputHistory::new(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["c", "b"]);
        assert_eq!(history.get(0), Some("c"));
    }

    #[test]
    fn consecutive_duplicates_collapse() {
        let mut history = InputHistory::new(10);
        history.push("help");
        history.push("help");
        history.push("echo");
        history.push("help");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["help", "echo", "help"]);
    }

    #[test]
    fn blank_input_ignored() {
        let mut history = InputHistory::new(10);
        history.push("   ");
        assert!(history.is_empty());
    }
}
