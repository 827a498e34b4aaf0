//! # SoC configuration
//!
//! The image variant and its options are fixed at build time through Cargo features.
//! [SocConfig::from_features] collects them into a const record, which can be adjusted with the
//! `with_*` builders for boards deviating from the default memory layout.
use pse84::{
    memmap::{CM33_NS_APP_BOOT_ADDR, CM55_XIP_ADDR},
    pdl::CY_IPC_MAX_ENDPOINTS,
};
use pse84_hal::{
    clocks::{ClkPath, PLL500M_CONFIG, PLL500M_RATE, SystemClock},
    fixed_clock::{FixedClock, FixedClockConfig, PllStartPolicy},
    mpu::{MpuRegion, SHARED_SRAM1_REGION},
    time::Hertz,
};

/// Core and image variant this run-time is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocVariant {
    /// Secure CM33 which keeps running the secure image.
    M33Secure,
    /// Secure CM33 which hands over to a non-secure image in the late init phase.
    M33SecureWithNs,
    /// CM55 application core.
    M55,
}

impl SocVariant {
    pub const fn from_features() -> Self {
        if cfg!(feature = "core-m55") {
            SocVariant::M55
        } else if cfg!(feature = "m33-ns-enable") {
            SocVariant::M33SecureWithNs
        } else {
            SocVariant::M33Secure
        }
    }

    /// Whether the variant runs with TrustZone partitioning of the clock tree.
    #[inline]
    pub const fn is_secure(&self) -> bool {
        matches!(self, SocVariant::M33Secure | SocVariant::M33SecureWithNs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocConfig {
    pub variant: SocVariant,
    /// SRAM area shared between the cores, mapped non-cacheable on the CM55.
    pub shared_region: MpuRegion,
    /// Clear the execute-never attribute of the first MPU regions on the CM55.
    pub clear_mpu_xn: bool,
    pub m55_enable: bool,
    /// Vector table of the CM55 image in external flash.
    pub m55_xip_addr: u32,
    pub has_fpu: bool,
    pub fpu_ns_usage: bool,
    pub ipc_endpoints: usize,
    /// Address of the non-secure boot image descriptor.
    pub boot_image_addr: u32,
    pub pll_start_policy: PllStartPolicy,
}

impl SocConfig {
    /// Configuration for `variant` with the default PSE84 memory layout and no options.
    pub const fn new(variant: SocVariant) -> Self {
        Self {
            variant,
            shared_region: SHARED_SRAM1_REGION,
            clear_mpu_xn: false,
            m55_enable: false,
            m55_xip_addr: CM55_XIP_ADDR,
            has_fpu: false,
            fpu_ns_usage: false,
            ipc_endpoints: CY_IPC_MAX_ENDPOINTS,
            boot_image_addr: CM33_NS_APP_BOOT_ADDR,
            pll_start_policy: if variant.is_secure() {
                PllStartPolicy::Reconfigure
            } else {
                PllStartPolicy::KeepIfEnabled
            },
        }
    }

    pub const fn from_features() -> Self {
        Self::new(SocVariant::from_features())
            .with_clear_mpu_xn(cfg!(feature = "arm-mpu"))
            .with_m55_enable(cfg!(feature = "m55-enable"))
            .with_fpu(cfg!(target_abi = "eabihf"), cfg!(feature = "fpu-ns"))
    }

    pub const fn with_shared_region(mut self, region: MpuRegion) -> Self {
        self.shared_region = region;
        self
    }

    pub const fn with_clear_mpu_xn(mut self, clear: bool) -> Self {
        self.clear_mpu_xn = clear;
        self
    }

    pub const fn with_m55_enable(mut self, enable: bool) -> Self {
        self.m55_enable = enable;
        self
    }

    pub const fn with_m55_xip_addr(mut self, addr: u32) -> Self {
        self.m55_xip_addr = addr;
        self
    }

    pub const fn with_fpu(mut self, has_fpu: bool, ns_usage: bool) -> Self {
        self.has_fpu = has_fpu;
        self.fpu_ns_usage = ns_usage;
        self
    }

    pub const fn with_boot_image_addr(mut self, addr: u32) -> Self {
        self.boot_image_addr = addr;
        self
    }

    pub const fn with_pll_start_policy(mut self, policy: PllStartPolicy) -> Self {
        self.pll_start_policy = policy;
        self
    }

    /// The non-secure image may only use the FPU if the core has one.
    #[inline]
    pub const fn fpu_ns_enabled(&self) -> bool {
        self.has_fpu && self.fpu_ns_usage
    }
}

impl Default for SocConfig {
    fn default() -> Self {
        Self::from_features()
    }
}

pub const CLK_IMO: FixedClock = FixedClock::new(FixedClockConfig::new(
    Hertz::from_raw(50_000_000),
    SystemClock::Imo,
));
pub const CLK_IHO: FixedClock = FixedClock::new(FixedClockConfig::new(
    Hertz::from_raw(50_000_000),
    SystemClock::Iho,
));
pub const CLK_PILO: FixedClock = FixedClock::new(FixedClockConfig::new(
    Hertz::from_raw(32_768),
    SystemClock::Pilo,
));
pub const CLK_DPLL500: FixedClock =
    FixedClock::new(FixedClockConfig::new(PLL500M_RATE, SystemClock::Dpll500))
        .with_dpll_hp(ClkPath::DPLL_HP0, &PLL500M_CONFIG);

/// Fixed clock nodes in initialization order, each with whether the board declares it. The IMO
/// node is always present.
const FIXED_CLOCK_NODES: [(FixedClock, bool); 4] = [
    (CLK_IMO, true),
    (CLK_IHO, cfg!(feature = "clk-iho")),
    (CLK_PILO, cfg!(feature = "clk-pilo")),
    (CLK_DPLL500, cfg!(feature = "dpll-hp")),
];

const fn declared_count(nodes: &[(FixedClock, bool)]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < nodes.len() {
        if nodes[i].1 {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Collect the declared nodes. `N` must be the [declared_count] of `nodes`.
const fn declared<const N: usize>(nodes: &[(FixedClock, bool)]) -> [FixedClock; N] {
    let mut clocks = [CLK_IMO; N];
    let mut n = 0;
    let mut i = 0;
    while i < nodes.len() {
        if nodes[i].1 {
            clocks[n] = nodes[i].0;
            n += 1;
        }
        i += 1;
    }
    clocks
}

const DECLARED_CLOCKS: [FixedClock; declared_count(&FIXED_CLOCK_NODES)] =
    declared(&FIXED_CLOCK_NODES);

/// Fixed clock nodes declared for the board, in initialization order.
pub const FIXED_CLOCKS: &[FixedClock] = &DECLARED_CLOCKS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(any(feature = "core-m55", feature = "m33-ns-enable")))]
    fn test_default_variant() {
        assert_eq!(SocVariant::from_features(), SocVariant::M33Secure);
        let config = SocConfig::from_features();
        assert_eq!(config.boot_image_addr, 0x6030_0000);
        assert_eq!(config.ipc_endpoints, 8);
        assert_eq!(config.pll_start_policy, PllStartPolicy::Reconfigure);
    }

    #[test]
    fn test_m55_keeps_running_pll() {
        let config = SocConfig::new(SocVariant::M55);
        assert_eq!(config.pll_start_policy, PllStartPolicy::KeepIfEnabled);
    }

    #[test]
    fn test_fpu_ns_requires_fpu() {
        let config = SocConfig::new(SocVariant::M33SecureWithNs);
        assert!(!config.with_fpu(false, true).fpu_ns_enabled());
        assert!(!config.with_fpu(true, false).fpu_ns_enabled());
        assert!(config.with_fpu(true, true).fpu_ns_enabled());
    }

    #[test]
    fn test_declared_clocks() {
        let nodes = [(CLK_IMO, true), (CLK_IHO, false), (CLK_PILO, true), (CLK_DPLL500, false)];
        assert_eq!(declared_count(&nodes), 2);
        let clocks: [FixedClock; 2] = declared(&nodes);
        assert_eq!(clocks[0].system_clock(), SystemClock::Imo);
        assert_eq!(clocks[1].system_clock(), SystemClock::Pilo);
    }

    #[test]
    #[cfg(not(any(feature = "clk-iho", feature = "clk-pilo", feature = "dpll-hp")))]
    fn test_undeclared_oscillators_stay_off() {
        assert_eq!(FIXED_CLOCKS.len(), 1);
        assert_eq!(FIXED_CLOCKS[0].system_clock(), SystemClock::Imo);
    }
}
