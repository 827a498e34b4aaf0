//! # Power domains and power modes
use crate::time::Microseconds;

/// Power dependency control matrix (PDCM) domain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PdcmId {
    Main = 0,
    Pd0 = 1,
    Pd1 = 2,
    /// Secure CM33 CPU.
    SysCpu = 3,
    /// CM55 CPU subsystem, including the TCMs.
    AppCpuSs = 4,
    /// CM55 CPU.
    AppCpu = 5,
    Socmem = 6,
}

/// Mode entered by a power domain when its owner requests deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DeepSleepMode {
    DeepSleep = 0,
    DeepSleepRam = 1,
    DeepSleepOff = 2,
    None = 3,
}

/// Time granted to the CM55 to leave reset after its power domain was enabled.
pub const CM55_BOOT_WAIT_TIME: Microseconds = Microseconds::from_ticks(10);
