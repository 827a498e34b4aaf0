//! # Memory protection unit helpers
//!
//! The M55 shares part of SRAM1 with the M33 cores. That area must be mapped non-cacheable
//! before the data cache is enabled, otherwise the cores see stale data in their IPC buffers.
use core::sync::atomic::{Ordering, compiler_fence};

use arbitrary_int::{u3, u27};
use pse84::memmap::{SRAM1_NS_SAHB_SHARED_START, SRAM1_SHARED_SIZE};
use pse84::mpu::{AccessPermission, Ctrl, MmioMpu, Rbar, Rlar, Shareability, set_mair_slot};

/// Normal memory attribute encoding `ARM_MPU_ATTR(outer, inner)` with both halves
/// non-cacheable.
pub const ATTR_NORMAL_NON_CACHEABLE: u8 = 0x44;

/// MPU region number reserved for the shared SRAM1 area.
pub const SHARED_MEM_REGION: u8 = 6;
/// MAIR slot reserved for the shared SRAM1 area.
pub const SHARED_MEM_ATTR_INDEX: u8 = 6;

/// Number of regions whose execute-never bit is cleared to allow running code from SRAM.
pub const XN_CLEAR_REGION_COUNT: u8 = 8;

/// MPU regions are defined on a 32 byte granularity.
pub const REGION_ALIGNMENT: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRegion {
    #[error("region size is zero")]
    ZeroSize,
    #[error("region base {0:#010x} is not 32 byte aligned")]
    UnalignedBase(u32),
    #[error("region size {0:#x} is not a multiple of 32 bytes")]
    UnalignedSize(u32),
    #[error("region exceeds the 32-bit address space")]
    Overflow,
}

/// One MPU region together with the memory attribute it refers to.
///
/// Base and size are validated on construction, the region covers exactly
/// `[base, base + size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpuRegion {
    number: u8,
    attr_index: u3,
    attr: u8,
    base: u32,
    size: u32,
    shareability: Shareability,
    access: AccessPermission,
    execute_never: bool,
}

impl MpuRegion {
    /// Inner shareable, read/write for any privilege level, execute never.
    pub const fn non_cacheable(
        number: u8,
        attr_index: u3,
        base: u32,
        size: u32,
    ) -> Result<Self, InvalidRegion> {
        if size == 0 {
            return Err(InvalidRegion::ZeroSize);
        }
        if base % REGION_ALIGNMENT != 0 {
            return Err(InvalidRegion::UnalignedBase(base));
        }
        if size % REGION_ALIGNMENT != 0 {
            return Err(InvalidRegion::UnalignedSize(size));
        }
        if base.checked_add(size - 1).is_none() {
            return Err(InvalidRegion::Overflow);
        }
        Ok(Self {
            number,
            attr_index,
            attr: ATTR_NORMAL_NON_CACHEABLE,
            base,
            size,
            shareability: Shareability::InnerShareable,
            access: AccessPermission::ReadWrite,
            execute_never: true,
        })
    }

    #[inline]
    pub const fn number(&self) -> u8 {
        self.number
    }

    #[inline]
    pub const fn base(&self) -> u32 {
        self.base
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Inclusive limit address of the region.
    #[inline]
    pub const fn limit(&self) -> u32 {
        self.base + (self.size - 1)
    }

    pub fn rbar(&self) -> Rbar {
        Rbar::DEFAULT
            .with_base(u27::new(self.base >> 5))
            .with_shareability(self.shareability)
            .with_access(self.access)
            .with_xn(self.execute_never)
    }

    pub fn rlar(&self) -> Rlar {
        Rlar::DEFAULT
            .with_limit(u27::new(self.limit() >> 5))
            .with_attr_index(self.attr_index)
            .with_enable(true)
    }
}

/// Default shared SRAM1 region of the PSE84 memory layout.
pub const SHARED_SRAM1_REGION: MpuRegion = match MpuRegion::non_cacheable(
    SHARED_MEM_REGION,
    u3::new(SHARED_MEM_ATTR_INDEX),
    SRAM1_NS_SAHB_SHARED_START,
    SRAM1_SHARED_SIZE,
) {
    Ok(region) => region,
    Err(_) => panic!("invalid shared SRAM1 region"),
};

/// `SHCSR.MEMFAULTENA`: MPU violations raise MemManage instead of escalating to HardFault.
pub const SHCSR_MEMFAULTENA: u32 = 1 << 16;

/// SHCSR value with the MemManage fault handler enabled.
#[inline]
pub const fn shcsr_with_memfault(shcsr: u32) -> u32 {
    shcsr | SHCSR_MEMFAULTENA
}

/// Program a single region and re-enable the MPU with the default background map.
///
/// The MPU is disabled while the region is written. The caller is responsible for the
/// DSB/ISB barriers required before the new configuration is relied on.
pub fn configure_region(mpu: &mut MmioMpu<'static>, region: &MpuRegion) {
    compiler_fence(Ordering::SeqCst);
    mpu.modify_ctrl(|ctrl| ctrl.with_enable(false));

    let (mair0, mair1) = set_mair_slot(
        mpu.read_mair0(),
        mpu.read_mair1(),
        region.attr_index,
        region.attr,
    );
    mpu.write_mair0(mair0);
    mpu.write_mair1(mair1);

    mpu.write_rnr(region.number as u32);
    mpu.write_rbar(region.rbar());
    mpu.write_rlar(region.rlar());

    mpu.write_ctrl(Ctrl::DEFAULT.with_privdefena(true).with_enable(true));
    compiler_fence(Ordering::SeqCst);
}

/// Clear the execute-never attribute of the first `count` regions.
pub fn clear_execute_never(mpu: &mut MmioMpu<'static>, count: u8) {
    for index in 0..count {
        mpu.write_rnr(index as u32);
        let rbar = mpu.read_rbar();
        if rbar.xn() {
            mpu.write_rbar(rbar.with_xn(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_region_limit() {
        assert_eq!(
            SHARED_SRAM1_REGION.limit(),
            SRAM1_NS_SAHB_SHARED_START + SRAM1_SHARED_SIZE - 1
        );
    }

    #[test]
    fn test_shared_region_registers() {
        let region = MpuRegion::non_cacheable(6, u3::new(6), 0x240F_0000, 0x1_0000).unwrap();
        let rbar = region.rbar();
        assert_eq!(rbar.base().value() << 5, 0x240F_0000);
        assert_eq!(rbar.shareability(), Shareability::InnerShareable);
        assert_eq!(rbar.access(), AccessPermission::ReadWrite);
        assert!(rbar.xn());

        let rlar = region.rlar();
        assert_eq!(rlar.raw_value(), 0x240F_FFE0 | (6 << 1) | 1);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(
            MpuRegion::non_cacheable(6, u3::new(6), 0x2408_0000, 0),
            Err(InvalidRegion::ZeroSize)
        );
    }

    #[test]
    fn test_unaligned_region_rejected() {
        assert_eq!(
            MpuRegion::non_cacheable(6, u3::new(6), 0x2408_0010, 0x1_0000),
            Err(InvalidRegion::UnalignedBase(0x2408_0010))
        );
        assert_eq!(
            MpuRegion::non_cacheable(6, u3::new(6), 0x2408_0000, 0x1_0010 - 8),
            Err(InvalidRegion::UnalignedSize(0x1_0008))
        );
    }

    #[test]
    fn test_region_end_of_address_space() {
        assert_eq!(
            MpuRegion::non_cacheable(6, u3::new(6), 0xFFFF_FFE0, 0x40),
            Err(InvalidRegion::Overflow)
        );
        let region = MpuRegion::non_cacheable(6, u3::new(6), 0xFFFF_FFE0, 0x20).unwrap();
        assert_eq!(region.limit(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_memfault_enable_keeps_other_handlers() {
        // USGFAULTENA and BUSFAULTENA already set.
        assert_eq!(shcsr_with_memfault(0x0006_0000), 0x0007_0000);
        assert_eq!(shcsr_with_memfault(0), SHCSR_MEMFAULTENA);
    }
}
