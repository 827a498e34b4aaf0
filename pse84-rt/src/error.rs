use pse84_hal::{clocks::ClockStartupError, sysint::SysIntError};

use crate::state::InvalidTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error("clock startup error: {0}")]
    ClockStartup(#[from] ClockStartupError),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("interrupt configuration error: {0}")]
    SysInt(#[from] SysIntError),
    #[error("no IPC pipe endpoint table provided")]
    MissingIpcEndpoints,
    #[error("CM55 start is not enabled for this image")]
    Cm55Disabled,
}
