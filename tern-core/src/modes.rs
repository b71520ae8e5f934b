//! Terminal mode set
//!
//! Modes are independently toggleable flags, kept as a membership set over
//! the `Mode` enum. A handful of modes are enabled on power-up.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::command::Mode;

/// Membership set of enabled terminal modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSet {
    enabled: HashSet<Mode>,
}

impl ModeSet {
    /// Create the power-up mode set
    pub fn new() -> Self {
        let mut enabled = HashSet::new();
        enabled.insert(Mode::AutoWrap);
        enabled.insert(Mode::VisibleCursor);
        enabled.insert(Mode::BlinkingCursor);
        Self { enabled }
    }

    /// Reset all modes to power-up defaults
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Flip a mode's membership
    pub fn set(&mut self, mode: Mode, enable: bool) {
        if enable {
            self.enabled.insert(mode);
        } else {
            self.enabled.remove(&mode);
        }
    }

    /// Test whether a mode is enabled
    pub fn enabled(&self, mode: Mode) -> bool {
        self.enabled.contains(&mode)
    }

    /// True if any mouse reporting protocol mode is active
    pub fn mouse_tracking(&self) -> bool {
        self.enabled(Mode::MouseExtended)
            || self.enabled(Mode::MouseSgr)
            || self.enabled(Mode::MouseUrxvt)
    }
}

impl Default for ModeSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_default() {
        let modes = ModeSet::new();
        assert!(modes.enabled(Mode::AutoWrap));
        assert!(modes.enabled(Mode::VisibleCursor));
        assert!(!modes.enabled(Mode::UseAlternateScreen));
        assert!(!modes.enabled(Mode::BracketedPaste));
    }

    #[test]
    fn test_set_and_clear() {
        let mut modes = ModeSet::new();

        modes.set(Mode::VisibleCursor, false);
        assert!(!modes.enabled(Mode::VisibleCursor));

        modes.set(Mode::Origin, true);
        assert!(modes.enabled(Mode::Origin));

        modes.set(Mode::Origin, false);
        assert!(!modes.enabled(Mode::Origin));
    }

    #[test]
    fn test_modes_reset() {
        let mut modes = ModeSet::new();
        modes.set(Mode::VisibleCursor, false);
        modes.set(Mode::UseAlternateScreen, true);

        modes.reset();

        assert!(modes.enabled(Mode::VisibleCursor));
        assert!(!modes.enabled(Mode::UseAlternateScreen));
    }
}
