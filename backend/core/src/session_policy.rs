//! Session-level access flags.

use serde::{Deserialize, Serialize};

/// What a session is allowed to do with the profile.
///
/// Mutation needs both flags: a verified creator who also has creator mode
/// switched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAccess {
    pub creator_logged_in: bool,
    pub creator_mode_active: bool,
}

impl SessionAccess {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn creator() -> Self {
        Self { creator_logged_in: true, creator_mode_active: true }
    }

    pub fn can_mutate(&self) -> bool {
        self.creator_logged_in && self.creator_mode_active
    }

    /// Flip creator mode. Guests cannot hold it; returns the new state.
    pub fn toggle_creator_mode(&mut self) -> bool {
        if self.creator_logged_in {
            self.creator_mode_active = !self.creator_mode_active;
        } else {
            self.creator_mode_active = false;
        }
        self.creator_mode_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_cannot_mutate() {
        assert!(!SessionAccess::guest().can_mutate());
    }

    #[test]
    fn creator_with_mode_off_cannot_mutate() {
        let mut access = SessionAccess::creator();
        assert!(access.can_mutate());
        assert!(!access.toggle_creator_mode());
        assert!(!access.can_mutate());
    }

    #[test]
    fn guest_toggle_stays_off() {
        let mut access = SessionAccess::guest();
        assert!(!access.toggle_creator_mode());
    }
}
