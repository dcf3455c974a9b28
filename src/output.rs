//! The console's output log.
//!
//! Every line is also emitted as a `tracing` event on the `devcon::output`
//! target so a host subscriber sees console traffic.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, error, info, warn};

/// Styling category of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Echoed user input.
    Input,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Input => "input",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One line of console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub message: String,
    pub severity: Severity,
}

type Listener = Box<dyn FnMut(&LogLine)>;

/// Bounded output buffer with change listeners.
pub struct OutputLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
    listeners: Vec<Listener>,
}

impl OutputLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
            listeners: Vec::new(),
        }
    }

    /// Append a line, evicting the oldest line when full.
    pub fn log(&mut self, message: impl Into<String>, severity: Severity) {
        let line = LogLine {
            message: message.into(),
            severity,
        };

        match severity {
            Severity::Input => debug!(target: "devcon::output", "{}", line.message),
            Severity::Info => info!(target: "devcon::output", "{}", line.message),
            Severity::Warning => warn!(target: "devcon::output", "{}", line.message),
            Severity::Error => error!(target: "devcon::output", "{}", line.message),
        }

        for listener in &mut self.listeners {
            listener(&line);
        }

        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Register a callback invoked for every new line.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&LogLine) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    /// The whole log as text, one line per entry.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl fmt::Debug for OutputLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLog")
            .field("lines", &self.lines.len())
            .field("capacity", &self.capacity)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
