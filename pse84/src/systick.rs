//! # System tick timer
use arbitrary_int::u24;

use crate::memmap::SCS_BASE;

pub const SYSTICK_OFFSET: usize = 0x10;

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum ClockSource {
    External = 0,
    Processor = 1,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ControlStatus {
    /// Set when the counter reached zero since the last read.
    #[bit(16, r)]
    countflag: bool,
    #[bit(2, rw)]
    clksource: ClockSource,
    /// Exception request on reaching zero.
    #[bit(1, rw)]
    tickint: bool,
    #[bit(0, rw)]
    enable: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Reload {
    #[bits(0..=23, rw)]
    value: u24,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct SysTick {
    csr: ControlStatus,
    rvr: Reload,
    cvr: u32,
    #[mmio(PureRead)]
    calib: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<SysTick>(), 0x10);

impl SysTick {
    /// Create a new SysTick MMIO instance for the current security state.
    ///
    /// # Safety
    ///
    /// This API can be used to create multiple handles to the same peripheral. The user must
    /// ensure that concurrent accesses do not interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioSysTick<'static> {
        unsafe { Self::new_mmio_at(SCS_BASE + SYSTICK_OFFSET) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_keeps_clock_source() {
        let csr = ControlStatus::new_with_raw_value(0b111);
        let disabled = csr.with_enable(false).with_tickint(false);
        assert_eq!(disabled.raw_value(), 0b100);
        assert_eq!(disabled.clksource(), ClockSource::Processor);
    }
}
