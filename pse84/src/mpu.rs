//! # Memory Protection Unit (ARMv8-M)
//!
//! Register block of the ARMv8-M / ARMv8.1-M protected memory system architecture as implemented
//! on the Cortex-M33 and Cortex-M55 cores.
use arbitrary_int::{u3, u27};

use crate::memmap::{SCS_BASE, SCS_BASE_NS};

pub const MPU_OFFSET: usize = 0xD90;

/// Number of memory attribute indirection slots in MAIR0 and MAIR1.
pub const MAIR_SLOTS: usize = 8;

#[bitbybit::bitfield(u32, debug)]
pub struct Type {
    /// Number of regions supported by the MPU.
    #[bits(8..=15, r)]
    dregion: u8,
    #[bit(0, r)]
    separate: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Ctrl {
    /// Use the default memory map as background region for privileged accesses.
    #[bit(2, rw)]
    privdefena: bool,
    /// Keep the MPU enabled during HardFault and NMI handlers.
    #[bit(1, rw)]
    hfnmiena: bool,
    #[bit(0, rw)]
    enable: bool,
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum Shareability {
    NonShareable = 0b00,
    __Reserved = 0b01,
    OuterShareable = 0b10,
    InnerShareable = 0b11,
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum AccessPermission {
    /// Read/write by privileged code only.
    PrivilegedReadWrite = 0b00,
    /// Read/write by any privilege level.
    ReadWrite = 0b01,
    /// Read-only by privileged code only.
    PrivilegedReadOnly = 0b10,
    /// Read-only by any privilege level.
    ReadOnly = 0b11,
}

/// Region base address register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Rbar {
    /// Bits \[31:5\] of the region base address.
    #[bits(5..=31, rw)]
    base: u27,
    #[bits(3..=4, rw)]
    shareability: Shareability,
    #[bits(1..=2, rw)]
    access: AccessPermission,
    /// Execute never.
    #[bit(0, rw)]
    xn: bool,
}

/// Region limit address register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Rlar {
    /// Bits \[31:5\] of the inclusive region limit address.
    #[bits(5..=31, rw)]
    limit: u27,
    /// Privileged execute never. Only implemented on ARMv8.1-M cores.
    #[bit(4, rw)]
    pxn: bool,
    /// Index into MAIR0/MAIR1.
    #[bits(1..=3, rw)]
    attr_index: u3,
    #[bit(0, rw)]
    enable: bool,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Mpu {
    #[mmio(PureRead)]
    mpu_type: Type,
    ctrl: Ctrl,
    /// Region number register.
    rnr: u32,
    rbar: Rbar,
    rlar: Rlar,
    _alias: [u32; 6],
    _reserved: u32,
    /// Attribute indirection register for indices 0..=3.
    mair0: u32,
    /// Attribute indirection register for indices 4..=7.
    mair1: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Mpu>(), 0x38);

impl Mpu {
    /// Create a new handle to the MPU of the current security state.
    ///
    /// # Safety
    ///
    /// If you create multiple instances of this handle at the same time, you are responsible for
    /// ensuring that there are no read-modify-write races on any of the registers.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioMpu<'static> {
        unsafe { Self::new_mmio_at(SCS_BASE + MPU_OFFSET) }
    }

    /// Create a new handle to the non-secure MPU alias. Only accessible from the secure state.
    ///
    /// # Safety
    ///
    /// See [Self::new_mmio_fixed].
    #[inline]
    pub const unsafe fn new_mmio_fixed_ns() -> MmioMpu<'static> {
        unsafe { Self::new_mmio_at(SCS_BASE_NS + MPU_OFFSET) }
    }
}

/// Replace the attribute byte for the given MAIR slot inside the combined MAIR0/MAIR1 value.
///
/// Returns the new `(mair0, mair1)` pair. Slots 4 to 7 live in MAIR1.
pub const fn set_mair_slot(mair0: u32, mair1: u32, slot: u3, attr: u8) -> (u32, u32) {
    let slot = slot.value() as u32;
    let shift = (slot % 4) * 8;
    let mask = !(0xFF << shift);
    let value = (attr as u32) << shift;
    if slot < 4 {
        ((mair0 & mask) | value, mair1)
    } else {
        (mair0, (mair1 & mask) | value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbar_encoding() {
        let rbar = Rbar::DEFAULT
            .with_base(u27::new(0x2408_0000 >> 5))
            .with_shareability(Shareability::InnerShareable)
            .with_access(AccessPermission::ReadWrite)
            .with_xn(true);
        assert_eq!(rbar.raw_value(), 0x2408_0000 | (0b11 << 3) | (0b01 << 1) | 1);
    }

    #[test]
    fn test_rlar_encoding() {
        let rlar = Rlar::DEFAULT
            .with_limit(u27::new(0x2408_FFFF >> 5))
            .with_attr_index(u3::new(6))
            .with_enable(true);
        assert_eq!(rlar.raw_value(), 0x2408_FFE0 | (6 << 1) | 1);
    }

    #[test]
    fn test_mair_slot_lower() {
        let (mair0, mair1) = set_mair_slot(0xFFFF_FFFF, 0, u3::new(1), 0x44);
        assert_eq!(mair0, 0xFFFF_44FF);
        assert_eq!(mair1, 0);
    }

    #[test]
    fn test_mair_slot_upper() {
        let (mair0, mair1) = set_mair_slot(0, 0x1234_5678, u3::new(6), 0x44);
        assert_eq!(mair0, 0);
        assert_eq!(mair1, 0x1244_5678);
    }
}
