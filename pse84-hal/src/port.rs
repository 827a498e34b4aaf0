//! # Platform port
//!
//! The boot sequencers never touch hardware directly. Every side effect goes through one of the
//! capability traits in this module, which together form the [PlatformPort]. The production
//! implementation [Pse84Port] forwards to the vendor driver library and the architectural
//! registers. [recorder::CallRecorder] records the calls for host tests.
use pse84::pdl::{IpcPipeEndpoint, IsrAddress};

use crate::{
    clocks::{ClkHf, ClkHfDivider, ClkPath, DpllHpConfig, SysClkError},
    mpu::MpuRegion,
    peri::{MmioSlave, PeriGroup, SlaveCtl},
    power::{DeepSleepMode, PdcmId},
    time::Microseconds,
};

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod hw;
#[cfg(any(test, feature = "recorder"))]
pub mod recorder;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use hw::Pse84Port;

/// Clock tree and peripheral group primitives.
pub trait ClockPort {
    fn clk_hf_set_source(&mut self, clk_hf: ClkHf, path: ClkPath) -> Result<(), SysClkError>;
    fn clk_hf_set_divider(&mut self, clk_hf: ClkHf, divider: ClkHfDivider)
    -> Result<(), SysClkError>;
    fn clk_hf_enable(&mut self, clk_hf: ClkHf) -> Result<(), SysClkError>;

    fn peri_group_set_slave_ctl(
        &mut self,
        group: PeriGroup,
        reg: SlaveCtl,
        value: u32,
    ) -> Result<(), SysClkError>;
    /// Release a single memory-mapped slave from reset and enable its clock.
    fn peri_group_slave_init(&mut self, slave: MmioSlave);

    fn pll_is_enabled(&mut self, path: ClkPath) -> bool;
    fn pll_disable(&mut self, path: ClkPath) -> Result<(), SysClkError>;
    fn pll_manual_configure(
        &mut self,
        path: ClkPath,
        config: &DpllHpConfig,
    ) -> Result<(), SysClkError>;
    /// Enable the PLL and busy-wait for lock, at most for `timeout`.
    fn pll_enable(&mut self, path: ClkPath, timeout: Microseconds) -> Result<(), SysClkError>;

    fn iho_enable(&mut self);
    fn pilo_enable(&mut self);

    /// Recalculate the cached core clock frequency from the clock tree.
    fn system_core_clock_update(&mut self);
    /// Vendor system initialization: core clock computation and flash wait states.
    fn system_init(&mut self);
}

/// Power domain primitives.
pub trait PowerPort {
    fn enable_pd1(&mut self);
    fn enable_socmem(&mut self, enable: bool);
    fn clear_pd_dependency(&mut self, host: PdcmId, dest: PdcmId);
    /// Power up the CM55 and release it from reset with the given vector table.
    fn enable_cm55(&mut self, vector_table: u32, wait: Microseconds);
    fn set_deep_sleep_mode(&mut self, mode: DeepSleepMode);
    fn set_socmem_deep_sleep_mode(&mut self, mode: DeepSleepMode);
}

/// Security attribution and memory protection primitives.
pub trait ProtectionPort {
    fn sau_init(&mut self);
    fn scb_setup(&mut self);
    fn nvic_ns_setup(&mut self);
    /// Grant the non-secure state access to the FPU.
    fn fpu_ns_init(&mut self);
    fn mpc_init(&mut self);
    fn ppc_init(&mut self, ppc: Ppc);
    fn configure_mpu_region(&mut self, region: &MpuRegion);
    fn clear_mpu_execute_never(&mut self, region_count: u8);
}

/// Peripheral protection controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ppc {
    Ppc0,
    Ppc1,
}

/// Cache and barrier primitives of the local core.
pub trait CachePort {
    /// Data memory barrier followed by an instruction synchronization barrier.
    fn barrier(&mut self);
    fn enable_icache(&mut self);
    fn enable_dcache(&mut self);
}

/// Primitives of the local core and of the host operating system.
pub trait CorePort {
    fn enable_irq(&mut self);
    fn disable_irq(&mut self);
    /// Read a word from a fixed physical address.
    fn read_word(&mut self, addr: u32) -> u32;
    fn set_msp_ns(&mut self, stack_pointer: u32);
    /// Stop the system tick timer and mask its exception.
    fn disable_systick(&mut self);
    /// Call into the non-secure state. Does not return on hardware.
    fn call_non_secure(&mut self, entry: u32);
    /// Park the calling context. Does not return on hardware.
    fn park(&mut self);
    fn ipc_pipe_config(&mut self, endpoints: &'static mut [IpcPipeEndpoint]);
    fn connect_dynamic_irq(&mut self, irq: u32, priority: u32, isr: IsrAddress);
}

/// The complete capability set required by the boot sequencers.
pub trait PlatformPort: ClockPort + PowerPort + ProtectionPort + CachePort + CorePort {}

impl<T: ClockPort + PowerPort + ProtectionPort + CachePort + CorePort> PlatformPort for T {}
