//! Recording platform port for host tests.
//!
//! [CallRecorder] implements every capability trait by appending a [Call] to an in-memory log.
//! Failures of the fallible clock primitives can be injected per call, and reads of physical
//! memory words are served from a small table.
use pse84::pdl::{IpcPipeEndpoint, IsrAddress};

use super::{CachePort, ClockPort, CorePort, Ppc, PowerPort, ProtectionPort};
use crate::{
    clocks::{ClkHf, ClkHfDivider, ClkPath, ClockStartupError, DpllHpConfig, SysClkError},
    fatal::FatalHook,
    mpu::MpuRegion,
    peri::{MmioSlave, PeriGroup, SlaveCtl},
    power::{DeepSleepMode, PdcmId},
    time::Microseconds,
};

/// Capacity of the call log. Calls beyond this are dropped.
pub const MAX_CALLS: usize = 128;
const MAX_WORDS: usize = 8;
const MAX_FAILURES: usize = 4;

/// One platform primitive invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    ClkHfSetSource(ClkHf, ClkPath),
    ClkHfSetDivider(ClkHf, ClkHfDivider),
    ClkHfEnable(ClkHf),
    PeriGroupSetSlaveCtl(PeriGroup, SlaveCtl, u32),
    PeriGroupSlaveInit(MmioSlave),
    PllIsEnabled(ClkPath),
    PllDisable(ClkPath),
    PllManualConfigure(ClkPath, DpllHpConfig),
    PllEnable(ClkPath, Microseconds),
    IhoEnable,
    PiloEnable,
    SystemCoreClockUpdate,
    SystemInit,

    EnablePd1,
    EnableSocmem(bool),
    ClearPdDependency(PdcmId, PdcmId),
    EnableCm55 { vector_table: u32, wait: Microseconds },
    SetDeepSleepMode(DeepSleepMode),
    SetSocmemDeepSleepMode(DeepSleepMode),

    SauInit,
    ScbSetup,
    NvicNsSetup,
    FpuNsInit,
    MpcInit,
    PpcInit(Ppc),
    ConfigureMpuRegion(MpuRegion),
    ClearMpuExecuteNever(u8),

    Barrier,
    EnableICache,
    EnableDCache,

    EnableIrq,
    DisableIrq,
    ReadWord(u32),
    SetMspNs(u32),
    DisableSysTick,
    CallNonSecure(u32),
    Park,
    /// Number of endpoints handed to the pipe driver.
    IpcPipeConfig(usize),
    ConnectDynamicIrq { irq: u32, priority: u32, has_isr: bool },
}

#[derive(Debug, Default)]
pub struct CallRecorder {
    calls: heapless::Vec<Call, MAX_CALLS>,
    words: heapless::Vec<(u32, u32), MAX_WORDS>,
    failures: heapless::Vec<(Call, SysClkError), MAX_FAILURES>,
    pll_enabled: bool,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for reads of the word at `addr`. Unknown addresses read as zero.
    pub fn with_word(mut self, addr: u32, value: u32) -> Self {
        let _ = self.words.push((addr, value));
        self
    }

    /// Let the fallible primitive invocation equal to `call` fail with `error`.
    pub fn with_failure(mut self, call: Call, error: SysClkError) -> Self {
        let _ = self.failures.push((call, error));
        self
    }

    /// Report the PLL as already running.
    pub fn with_pll_enabled(mut self) -> Self {
        self.pll_enabled = true;
        self
    }

    #[inline]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Index of the first occurrence of `call` in the log.
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    #[inline]
    pub fn contains(&self, call: &Call) -> bool {
        self.position(call).is_some()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: Call) {
        let _ = self.calls.push(call);
    }

    fn record_fallible(&mut self, call: Call) -> Result<(), SysClkError> {
        self.record(call);
        match self.failures.iter().find(|(c, _)| *c == call) {
            Some((_, error)) => Err(*error),
            None => Ok(()),
        }
    }
}

impl ClockPort for CallRecorder {
    fn clk_hf_set_source(&mut self, clk_hf: ClkHf, path: ClkPath) -> Result<(), SysClkError> {
        self.record_fallible(Call::ClkHfSetSource(clk_hf, path))
    }

    fn clk_hf_set_divider(
        &mut self,
        clk_hf: ClkHf,
        divider: ClkHfDivider,
    ) -> Result<(), SysClkError> {
        self.record_fallible(Call::ClkHfSetDivider(clk_hf, divider))
    }

    fn clk_hf_enable(&mut self, clk_hf: ClkHf) -> Result<(), SysClkError> {
        self.record_fallible(Call::ClkHfEnable(clk_hf))
    }

    fn peri_group_set_slave_ctl(
        &mut self,
        group: PeriGroup,
        reg: SlaveCtl,
        value: u32,
    ) -> Result<(), SysClkError> {
        self.record_fallible(Call::PeriGroupSetSlaveCtl(group, reg, value))
    }

    fn peri_group_slave_init(&mut self, slave: MmioSlave) {
        self.record(Call::PeriGroupSlaveInit(slave));
    }

    fn pll_is_enabled(&mut self, path: ClkPath) -> bool {
        self.record(Call::PllIsEnabled(path));
        self.pll_enabled
    }

    fn pll_disable(&mut self, path: ClkPath) -> Result<(), SysClkError> {
        self.record_fallible(Call::PllDisable(path))?;
        self.pll_enabled = false;
        Ok(())
    }

    fn pll_manual_configure(
        &mut self,
        path: ClkPath,
        config: &DpllHpConfig,
    ) -> Result<(), SysClkError> {
        self.record_fallible(Call::PllManualConfigure(path, *config))
    }

    fn pll_enable(&mut self, path: ClkPath, timeout: Microseconds) -> Result<(), SysClkError> {
        self.record_fallible(Call::PllEnable(path, timeout))?;
        self.pll_enabled = true;
        Ok(())
    }

    fn iho_enable(&mut self) {
        self.record(Call::IhoEnable);
    }

    fn pilo_enable(&mut self) {
        self.record(Call::PiloEnable);
    }

    fn system_core_clock_update(&mut self) {
        self.record(Call::SystemCoreClockUpdate);
    }

    fn system_init(&mut self) {
        self.record(Call::SystemInit);
    }
}

impl PowerPort for CallRecorder {
    fn enable_pd1(&mut self) {
        self.record(Call::EnablePd1);
    }

    fn enable_socmem(&mut self, enable: bool) {
        self.record(Call::EnableSocmem(enable));
    }

    fn clear_pd_dependency(&mut self, host: PdcmId, dest: PdcmId) {
        self.record(Call::ClearPdDependency(host, dest));
    }

    fn enable_cm55(&mut self, vector_table: u32, wait: Microseconds) {
        self.record(Call::EnableCm55 { vector_table, wait });
    }

    fn set_deep_sleep_mode(&mut self, mode: DeepSleepMode) {
        self.record(Call::SetDeepSleepMode(mode));
    }

    fn set_socmem_deep_sleep_mode(&mut self, mode: DeepSleepMode) {
        self.record(Call::SetSocmemDeepSleepMode(mode));
    }
}

impl ProtectionPort for CallRecorder {
    fn sau_init(&mut self) {
        self.record(Call::SauInit);
    }

    fn scb_setup(&mut self) {
        self.record(Call::ScbSetup);
    }

    fn nvic_ns_setup(&mut self) {
        self.record(Call::NvicNsSetup);
    }

    fn fpu_ns_init(&mut self) {
        self.record(Call::FpuNsInit);
    }

    fn mpc_init(&mut self) {
        self.record(Call::MpcInit);
    }

    fn ppc_init(&mut self, ppc: Ppc) {
        self.record(Call::PpcInit(ppc));
    }

    fn configure_mpu_region(&mut self, region: &MpuRegion) {
        self.record(Call::ConfigureMpuRegion(*region));
    }

    fn clear_mpu_execute_never(&mut self, region_count: u8) {
        self.record(Call::ClearMpuExecuteNever(region_count));
    }
}

impl CachePort for CallRecorder {
    fn barrier(&mut self) {
        self.record(Call::Barrier);
    }

    fn enable_icache(&mut self) {
        self.record(Call::EnableICache);
    }

    fn enable_dcache(&mut self) {
        self.record(Call::EnableDCache);
    }
}

impl CorePort for CallRecorder {
    fn enable_irq(&mut self) {
        self.record(Call::EnableIrq);
    }

    fn disable_irq(&mut self) {
        self.record(Call::DisableIrq);
    }

    fn read_word(&mut self, addr: u32) -> u32 {
        self.record(Call::ReadWord(addr));
        self.words
            .iter()
            .find(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    fn set_msp_ns(&mut self, stack_pointer: u32) {
        self.record(Call::SetMspNs(stack_pointer));
    }

    fn disable_systick(&mut self) {
        self.record(Call::DisableSysTick);
    }

    fn call_non_secure(&mut self, entry: u32) {
        self.record(Call::CallNonSecure(entry));
    }

    fn park(&mut self) {
        self.record(Call::Park);
    }

    fn ipc_pipe_config(&mut self, endpoints: &'static mut [IpcPipeEndpoint]) {
        self.record(Call::IpcPipeConfig(endpoints.len()));
    }

    fn connect_dynamic_irq(&mut self, irq: u32, priority: u32, isr: IsrAddress) {
        self.record(Call::ConnectDynamicIrq {
            irq,
            priority,
            has_isr: isr.is_some(),
        });
    }
}

/// Fatal hook which remembers the reported errors instead of halting.
#[derive(Debug, Default)]
pub struct RecordingHook {
    errors: heapless::Vec<ClockStartupError, MAX_FAILURES>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn errors(&self) -> &[ClockStartupError] {
        &self.errors
    }
}

impl FatalHook for RecordingHook {
    fn clock_startup_error(&mut self, error: ClockStartupError) {
        let _ = self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure() {
        let mut port = CallRecorder::new()
            .with_failure(Call::ClkHfEnable(ClkHf::HF3), SysClkError::Timeout);
        assert_eq!(port.clk_hf_enable(ClkHf::HF11), Ok(()));
        assert_eq!(port.clk_hf_enable(ClkHf::HF3), Err(SysClkError::Timeout));
        assert_eq!(port.calls().len(), 2);
    }

    #[test]
    fn test_word_table() {
        let mut port = CallRecorder::new().with_word(0x6030_0000, 0x2000_1000);
        assert_eq!(port.read_word(0x6030_0000), 0x2000_1000);
        assert_eq!(port.read_word(0x6030_0004), 0);
        assert_eq!(port.position(&Call::ReadWord(0x6030_0004)), Some(1));
    }

    #[test]
    fn test_pll_state_tracking() {
        let mut port = CallRecorder::new().with_pll_enabled();
        assert!(port.pll_is_enabled(ClkPath::DPLL_HP0));
        port.pll_disable(ClkPath::DPLL_HP0).unwrap();
        assert!(!port.pll_is_enabled(ClkPath::DPLL_HP0));
    }
}
