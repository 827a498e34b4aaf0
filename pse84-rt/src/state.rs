//! Boot state machine.
//!
//! The transfer to the non-secure image can not be undone, so [BootState::Transferred] has no
//! outgoing transition.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    #[default]
    NotStarted,
    EarlyInitDone,
    HandoffInProgress,
    Transferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid boot state transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: BootState,
    pub to: BootState,
}

impl BootState {
    pub const fn can_transition(self, to: BootState) -> bool {
        matches!(
            (self, to),
            (BootState::NotStarted, BootState::EarlyInitDone)
                | (BootState::EarlyInitDone, BootState::HandoffInProgress)
                | (BootState::HandoffInProgress, BootState::Transferred)
        )
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, BootState::Transferred)
    }

    pub fn transition(&mut self, to: BootState) -> Result<(), InvalidTransition> {
        if !self.can_transition(to) {
            return Err(InvalidTransition { from: *self, to });
        }
        log::trace!("boot state {:?} -> {:?}", *self, to);
        *self = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path() {
        let mut state = BootState::default();
        state.transition(BootState::EarlyInitDone).unwrap();
        state.transition(BootState::HandoffInProgress).unwrap();
        state.transition(BootState::Transferred).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_state() {
        let mut state = BootState::Transferred;
        for to in [
            BootState::NotStarted,
            BootState::EarlyInitDone,
            BootState::HandoffInProgress,
            BootState::Transferred,
        ] {
            assert_eq!(
                state.transition(to),
                Err(InvalidTransition {
                    from: BootState::Transferred,
                    to
                })
            );
        }
        assert_eq!(state, BootState::Transferred);
    }

    #[test]
    fn test_no_skipping() {
        let mut state = BootState::NotStarted;
        assert!(state.transition(BootState::HandoffInProgress).is_err());
        assert!(state.transition(BootState::Transferred).is_err());
        state.transition(BootState::EarlyInitDone).unwrap();
        assert!(state.transition(BootState::EarlyInitDone).is_err());
        assert!(state.transition(BootState::NotStarted).is_err());
        assert_eq!(state, BootState::EarlyInitDone);
    }
}
