//! # Fatal error hook
//!
//! Clock tree failures during boot are unrecoverable. They are reported to a [FatalHook], which
//! by default logs the error and halts the core with interrupts masked.
use crate::clocks::ClockStartupError;

pub trait FatalHook {
    /// Called exactly once for the first unrecoverable clock startup failure.
    ///
    /// Hardware implementations usually do not return. If the hook returns, the boot sequence
    /// aborts with the error and does not perform any further step.
    fn clock_startup_error(&mut self, error: ClockStartupError);
}

/// Logs the error, masks interrupts and spins forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct HaltForever;

impl HaltForever {
    pub fn halt() -> ! {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        cortex_m::interrupt::disable();
        loop {
            core::hint::spin_loop();
        }
    }
}

impl FatalHook for HaltForever {
    fn clock_startup_error(&mut self, error: ClockStartupError) {
        log::error!("clock startup error {}: {}", error.code(), error);
        Self::halt()
    }
}

impl<F: FnMut(ClockStartupError)> FatalHook for F {
    fn clock_startup_error(&mut self, error: ClockStartupError) {
        self(error)
    }
}
