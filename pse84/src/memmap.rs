//! # Memory map
//!
//! Fixed addresses of the PSE84 memory regions used during boot. The partition related values
//! follow the default memory layout of the PSE84 evaluation kit and are normally overridden by
//! the board configuration.

/// Start of the M33 non-volatile memory partition inside the external flash (XIP) window.
pub const CM33_NVM_START: u32 = 0x6030_0000;

/// Location of the non-secure boot image descriptor.
///
/// Word 0 holds the initial non-secure main stack pointer, word 1 the non-secure reset handler.
pub const CM33_NS_APP_BOOT_ADDR: u32 = CM33_NVM_START;

/// Default execute-in-place start address of the CM55 application image.
pub const CM55_XIP_ADDR: u32 = 0x6058_0000;

/// Start of the SRAM1 window as seen through the non-secure system AHB.
pub const SRAM1_NS_SAHB_START: u32 = 0x2408_0000;

/// Start of the SRAM1 area which is shared between the M33 and M55 cores.
pub const SRAM1_NS_SAHB_SHARED_START: u32 = SRAM1_NS_SAHB_START + 0x7_0000;

/// Size of the shared SRAM1 area.
pub const SRAM1_SHARED_SIZE: u32 = 0x1_0000;

/// Base address of the CM55 control block (`MXCM55`).
pub const MXCM55_BASE: u32 = 0x4410_0000;

/// System control space base addresses.
pub const SCS_BASE: usize = 0xE000_E000;
/// Non-secure alias of the system control space.
pub const SCS_BASE_NS: usize = 0xE002_E000;

static_assertions::const_assert!(SRAM1_NS_SAHB_SHARED_START % 32 == 0);
static_assertions::const_assert!(SRAM1_SHARED_SIZE % 32 == 0);
