//! Visibility and gating flags carried by a command.

use bitflags::bitflags;

bitflags! {
    /// Flags accumulated across every definition registered under one key.
    ///
    /// Flags are OR'd on merge: a single cheat-flagged overload makes the
    /// whole command a cheat.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u8 {
        /// Only executable while cheats are enabled.
        const CHEAT = 1 << 0;
        /// Never listed or autofilled, but still executable.
        const HIDDEN = 1 << 1;
    }
}

impl CommandFlags {
    /// Build flags from the two boolean switches.
    pub fn from_switches(cheat: bool, hidden: bool) -> Self {
        let mut flags = CommandFlags::empty();
        flags.set(CommandFlags::CHEAT, cheat);
        flags.set(CommandFlags::HIDDEN, hidden);
        flags
    }

    #[inline]
    pub fn is_cheat(self) -> bool {
        self.contains(CommandFlags::CHEAT)
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.contains(CommandFlags::HIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches() {
        assert_eq!(CommandFlags::from_switches(false, false), CommandFlags::empty());
        let both = CommandFlags::from_switches(true, true);
        assert!(both.is_cheat());
        assert!(both.is_hidden());
    }

    #[test]
    fn merge_is_or() {
        let merged = CommandFlags::empty() | CommandFlags::CHEAT;
        assert!(merged.is_cheat());
        assert!(!merged.is_hidden());
    }
}
