//! # Fixed-rate clock sources
//!
//! A fixed clock node brings up one clock source of the system resources subsystem at boot,
//! before any driver relying on it is initialized. The rate itself is not configurable, it only
//! documents what the source provides.
//!
//! Only the high-performance DPLL needs a real bring-up. It is programmed from a static
//! configuration record, see [crate::clocks::PLL500M_CONFIG].
use crate::{
    clocks::{ClkPath, ClockStartupError, DpllHpConfig, PLL_ENABLE_TIMEOUT, SystemClock},
    fatal::FatalHook,
    port::ClockPort,
    time::Hertz,
};

/// Static description of a fixed clock node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClockConfig {
    pub rate: Hertz,
    pub system_clock: SystemClock,
}

impl FixedClockConfig {
    pub const fn new(rate: Hertz, system_clock: SystemClock) -> Self {
        Self { rate, system_clock }
    }
}

/// Behaviour when the PLL is found running at boot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PllStartPolicy {
    /// Always disable and reprogram the PLL. Required when the secure and non-secure images
    /// share the clock tree, because the secure image can not rely on earlier configuration.
    #[default]
    Reconfigure,
    /// Leave an already running PLL untouched.
    KeepIfEnabled,
}

/// High-performance DPLL instance attached to a clock node.
#[derive(Debug, Clone, Copy)]
pub struct DpllHp {
    pub path: ClkPath,
    pub config: &'static DpllHpConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    config: FixedClockConfig,
    dpll_hp: Option<DpllHp>,
    pll_start_policy: PllStartPolicy,
}

impl FixedClock {
    pub const fn new(config: FixedClockConfig) -> Self {
        Self {
            config,
            dpll_hp: None,
            pll_start_policy: PllStartPolicy::Reconfigure,
        }
    }

    /// Attach the DPLL instance which drives the [SystemClock::Dpll500] source.
    ///
    /// Without an attached DPLL, initializing a [SystemClock::Dpll500] node is a no-op.
    pub const fn with_dpll_hp(mut self, path: ClkPath, config: &'static DpllHpConfig) -> Self {
        self.dpll_hp = Some(DpllHp { path, config });
        self
    }

    pub const fn with_pll_start_policy(mut self, policy: PllStartPolicy) -> Self {
        self.pll_start_policy = policy;
        self
    }

    #[inline]
    pub const fn rate(&self) -> Hertz {
        self.config.rate
    }

    #[inline]
    pub const fn system_clock(&self) -> SystemClock {
        self.config.system_clock
    }

    /// Bring up the clock source.
    ///
    /// A failure of the DPLL bring-up is reported to `hook`. If the hook returns, the error is
    /// returned as well and no further clock primitive is called.
    pub fn init<P: ClockPort + ?Sized, F: FatalHook + ?Sized>(
        &self,
        port: &mut P,
        hook: &mut F,
    ) -> Result<(), ClockStartupError> {
        log::debug!(
            "fixed clock init: {:?} at {} Hz",
            self.config.system_clock,
            self.config.rate.raw()
        );
        match self.config.system_clock {
            SystemClock::Imo | SystemClock::Fll => (),
            SystemClock::Iho => port.iho_enable(),
            SystemClock::Pilo => port.pilo_enable(),
            SystemClock::Dpll500 => {
                if let Some(dpll) = self.dpll_hp {
                    if let Err(e) = self.dpll_hp_init(port, &dpll) {
                        hook.clock_startup_error(e);
                        return Err(e);
                    }
                    port.system_core_clock_update();
                }
            }
            other => log::debug!("no bring-up required for {other:?}"),
        }
        Ok(())
    }

    fn dpll_hp_init<P: ClockPort + ?Sized>(
        &self,
        port: &mut P,
        dpll: &DpllHp,
    ) -> Result<(), ClockStartupError> {
        if self.pll_start_policy == PllStartPolicy::KeepIfEnabled
            && port.pll_is_enabled(dpll.path)
        {
            log::debug!("DPLL already running, keeping configuration");
            return Ok(());
        }
        if let Err(e) = port.pll_disable(dpll.path) {
            log::warn!("disabling DPLL failed: {e}");
        }
        port
            .pll_manual_configure(dpll.path, dpll.config)
            .map_err(|e| {
                log::error!("DPLL configuration failed: {e}");
                ClockStartupError::Pll
            })?;
        port.pll_enable(dpll.path, PLL_ENABLE_TIMEOUT).map_err(|e| {
            log::error!("DPLL lock failed: {e}");
            ClockStartupError::Pll
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clocks::{PLL500M_CONFIG, PLL500M_RATE, SysClkError},
        port::recorder::{Call, CallRecorder, RecordingHook},
    };

    const PATH: ClkPath = ClkPath::DPLL_HP0;

    fn pll500() -> FixedClock {
        FixedClock::new(FixedClockConfig::new(PLL500M_RATE, SystemClock::Dpll500))
            .with_dpll_hp(PATH, &PLL500M_CONFIG)
    }

    #[test]
    fn test_imo_no_calls() {
        let mut port = CallRecorder::new();
        let mut hook = RecordingHook::new();
        let clock = FixedClock::new(FixedClockConfig::new(
            Hertz::from_raw(50_000_000),
            SystemClock::Imo,
        ));
        clock.init(&mut port, &mut hook).unwrap();
        assert!(port.calls().is_empty());
        assert!(hook.errors().is_empty());
    }

    #[test]
    fn test_fll_no_calls() {
        let mut port = CallRecorder::new();
        let clock = FixedClock::new(FixedClockConfig::new(
            Hertz::from_raw(100_000_000),
            SystemClock::Fll,
        ));
        clock.init(&mut port, &mut RecordingHook::new()).unwrap();
        assert!(port.calls().is_empty());
    }

    #[test]
    fn test_iho_and_pilo() {
        let mut port = CallRecorder::new();
        let mut hook = RecordingHook::new();
        FixedClock::new(FixedClockConfig::new(
            Hertz::from_raw(50_000_000),
            SystemClock::Iho,
        ))
        .init(&mut port, &mut hook)
        .unwrap();
        FixedClock::new(FixedClockConfig::new(Hertz::from_raw(32_768), SystemClock::Pilo))
            .init(&mut port, &mut hook)
            .unwrap();
        assert_eq!(port.calls(), &[Call::IhoEnable, Call::PiloEnable]);
    }

    #[test]
    fn test_pll500_sequence() {
        let mut port = CallRecorder::new();
        let mut hook = RecordingHook::new();
        let clock = pll500();
        clock.init(&mut port, &mut hook).unwrap();
        assert_eq!(clock.rate(), PLL500M_RATE);
        assert_eq!(
            port.calls(),
            &[
                Call::PllDisable(PATH),
                Call::PllManualConfigure(PATH, PLL500M_CONFIG),
                Call::PllEnable(PATH, PLL_ENABLE_TIMEOUT),
                Call::SystemCoreClockUpdate,
            ]
        );
        assert_eq!(PLL_ENABLE_TIMEOUT.ticks(), 10_000);
    }

    #[test]
    fn test_pll500_without_dpll_is_noop() {
        let mut port = CallRecorder::new();
        FixedClock::new(FixedClockConfig::new(PLL500M_RATE, SystemClock::Dpll500))
            .init(&mut port, &mut RecordingHook::new())
            .unwrap();
        assert!(port.calls().is_empty());
    }

    #[test]
    fn test_pll_enable_failure() {
        let mut port = CallRecorder::new().with_failure(
            Call::PllEnable(PATH, PLL_ENABLE_TIMEOUT),
            SysClkError::Timeout,
        );
        let mut hook = RecordingHook::new();
        let result = pll500().init(&mut port, &mut hook);
        assert_eq!(result, Err(ClockStartupError::Pll));
        assert_eq!(hook.errors(), &[ClockStartupError::Pll]);
        assert_eq!(hook.errors()[0].code(), 3);
        assert_eq!(
            port.calls().last(),
            Some(&Call::PllEnable(PATH, PLL_ENABLE_TIMEOUT))
        );
        assert!(!port.contains(&Call::SystemCoreClockUpdate));
    }

    #[test]
    fn test_pll_configure_failure() {
        let mut port = CallRecorder::new().with_failure(
            Call::PllManualConfigure(PATH, PLL500M_CONFIG),
            SysClkError::BadParam,
        );
        let mut hook = RecordingHook::new();
        let result = pll500().init(&mut port, &mut hook);
        assert_eq!(result, Err(ClockStartupError::Pll));
        assert_eq!(hook.errors(), &[ClockStartupError::Pll]);
        assert_eq!(port.calls().len(), 2);
    }

    #[test]
    fn test_pll_disable_failure_is_not_fatal() {
        let mut port =
            CallRecorder::new().with_failure(Call::PllDisable(PATH), SysClkError::InvalidState);
        let mut hook = RecordingHook::new();
        pll500().init(&mut port, &mut hook).unwrap();
        assert!(hook.errors().is_empty());
        assert_eq!(port.calls().len(), 4);
    }

    #[test]
    fn test_keep_if_enabled() {
        let mut port = CallRecorder::new().with_pll_enabled();
        let mut hook = RecordingHook::new();
        pll500()
            .with_pll_start_policy(PllStartPolicy::KeepIfEnabled)
            .init(&mut port, &mut hook)
            .unwrap();
        assert_eq!(
            port.calls(),
            &[Call::PllIsEnabled(PATH), Call::SystemCoreClockUpdate]
        );
    }

    #[test]
    fn test_keep_if_enabled_pll_stopped() {
        let mut port = CallRecorder::new();
        pll500()
            .with_pll_start_policy(PllStartPolicy::KeepIfEnabled)
            .init(&mut port, &mut RecordingHook::new())
            .unwrap();
        assert_eq!(port.position(&Call::PllIsEnabled(PATH)), Some(0));
        assert_eq!(port.position(&Call::PllDisable(PATH)), Some(1));
        assert_eq!(port.calls().len(), 5);
    }
}
