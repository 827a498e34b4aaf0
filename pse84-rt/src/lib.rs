//! Rust boot run-time support for the Infineon PSOC Edge E84 SoCs
//!
//! The host operating system calls into two extension points during boot: early init, before
//! any driver is initialized, and late init, right before the application starts. This crate
//! provides the sequences run at these points for each [SocVariant], as well as the CM55
//! bring-up.
//!
//! All sequences run through a [PlatformPort]. [Boot] ties a port, the [SocConfig] and a
//! [FatalHook] together and tracks the [BootState].
#![no_std]

use pse84::pdl::{IpcPipeEndpoint, IsrAddress};
use pse84_hal::{
    fatal::{FatalHook, HaltForever},
    fixed_clock::FixedClock,
    port::PlatformPort,
    sysint::{SysInt, SysIntConfig},
};

pub mod cm55;
pub mod config;
pub mod early_init;
pub mod error;
pub mod handoff;
#[cfg(all(target_arch = "arm", target_os = "none", feature = "hooks"))]
pub mod hooks;
pub mod image;
pub mod state;

pub use config::{SocConfig, SocVariant};
pub use error::BootError;
pub use pse84_hal as hal;
pub use state::{BootState, InvalidTransition};

/// Boot sequence of one [SocVariant].
pub trait BootSequence {
    const VARIANT: SocVariant;

    fn early_init<P: PlatformPort + ?Sized, F: FatalHook + ?Sized>(
        &mut self,
        port: &mut P,
        hook: &mut F,
        config: &SocConfig,
    ) -> Result<(), BootError>;

    /// Runs after driver initialization. `state` is [BootState::EarlyInitDone] on entry.
    fn late_init<P: PlatformPort + ?Sized>(
        &mut self,
        _port: &mut P,
        _config: &SocConfig,
        _state: &mut BootState,
    ) -> Result<(), BootError> {
        Ok(())
    }
}

/// Secure CM33 image without a non-secure image.
#[derive(Debug, Default)]
pub struct M33Secure;

impl BootSequence for M33Secure {
    const VARIANT: SocVariant = SocVariant::M33Secure;

    fn early_init<P: PlatformPort + ?Sized, F: FatalHook + ?Sized>(
        &mut self,
        port: &mut P,
        hook: &mut F,
        _config: &SocConfig,
    ) -> Result<(), BootError> {
        early_init::m33_secure(port, hook)?;
        Ok(())
    }
}

/// Secure CM33 image which hands over to a non-secure image.
#[derive(Debug, Default)]
pub struct M33SecureWithNs;

impl BootSequence for M33SecureWithNs {
    const VARIANT: SocVariant = SocVariant::M33SecureWithNs;

    fn early_init<P: PlatformPort + ?Sized, F: FatalHook + ?Sized>(
        &mut self,
        port: &mut P,
        hook: &mut F,
        _config: &SocConfig,
    ) -> Result<(), BootError> {
        early_init::m33_secure(port, hook)?;
        Ok(())
    }

    fn late_init<P: PlatformPort + ?Sized>(
        &mut self,
        port: &mut P,
        config: &SocConfig,
        state: &mut BootState,
    ) -> Result<(), BootError> {
        handoff::cm33_ns_startup(port, config, state)?;
        Ok(())
    }
}

/// CM55 image.
#[derive(Debug, Default)]
pub struct M55 {
    ipc_endpoints: Option<&'static mut [IpcPipeEndpoint]>,
}

impl M55 {
    pub fn new(ipc_endpoints: &'static mut [IpcPipeEndpoint]) -> Self {
        Self {
            ipc_endpoints: Some(ipc_endpoints),
        }
    }
}

impl BootSequence for M55 {
    const VARIANT: SocVariant = SocVariant::M55;

    fn early_init<P: PlatformPort + ?Sized, F: FatalHook + ?Sized>(
        &mut self,
        port: &mut P,
        _hook: &mut F,
        config: &SocConfig,
    ) -> Result<(), BootError> {
        let endpoints = self
            .ipc_endpoints
            .take()
            .ok_or(BootError::MissingIpcEndpoints)?;
        if endpoints.len() != config.ipc_endpoints {
            log::warn!(
                "IPC endpoint table has {} entries, expected {}",
                endpoints.len(),
                config.ipc_endpoints
            );
        }
        early_init::m55(port, config, endpoints);
        Ok(())
    }
}

/// Sequence selected from a [SocVariant] value.
#[derive(Debug)]
pub enum Sequence {
    M33Secure(M33Secure),
    M33SecureWithNs(M33SecureWithNs),
    M55(M55),
}

impl Sequence {
    pub fn for_variant(variant: SocVariant) -> Self {
        match variant {
            SocVariant::M33Secure => Sequence::M33Secure(M33Secure),
            SocVariant::M33SecureWithNs => Sequence::M33SecureWithNs(M33SecureWithNs),
            SocVariant::M55 => Sequence::M55(M55::default()),
        }
    }

    pub fn variant(&self) -> SocVariant {
        match self {
            Sequence::M33Secure(_) => M33Secure::VARIANT,
            Sequence::M33SecureWithNs(_) => M33SecureWithNs::VARIANT,
            Sequence::M55(_) => M55::VARIANT,
        }
    }

    fn early_init<P: PlatformPort + ?Sized, F: FatalHook + ?Sized>(
        &mut self,
        port: &mut P,
        hook: &mut F,
        config: &SocConfig,
    ) -> Result<(), BootError> {
        match self {
            Sequence::M33Secure(seq) => seq.early_init(port, hook, config),
            Sequence::M33SecureWithNs(seq) => seq.early_init(port, hook, config),
            Sequence::M55(seq) => seq.early_init(port, hook, config),
        }
    }

    fn late_init<P: PlatformPort + ?Sized>(
        &mut self,
        port: &mut P,
        config: &SocConfig,
        state: &mut BootState,
    ) -> Result<(), BootError> {
        match self {
            Sequence::M33Secure(seq) => seq.late_init(port, config, state),
            Sequence::M33SecureWithNs(seq) => seq.late_init(port, config, state),
            Sequence::M55(seq) => seq.late_init(port, config, state),
        }
    }
}

/// Boot driver for one core.
pub struct Boot<P, F = HaltForever> {
    port: P,
    hook: F,
    config: SocConfig,
    state: BootState,
    sequence: Sequence,
}

impl<P: PlatformPort> Boot<P, HaltForever> {
    pub fn new(port: P, config: SocConfig) -> Self {
        Self {
            port,
            hook: HaltForever,
            sequence: Sequence::for_variant(config.variant),
            config,
            state: BootState::NotStarted,
        }
    }
}

impl<P: PlatformPort, F: FatalHook> Boot<P, F> {
    pub fn with_fatal_hook<G: FatalHook>(self, hook: G) -> Boot<P, G> {
        Boot {
            port: self.port,
            hook,
            config: self.config,
            state: self.state,
            sequence: self.sequence,
        }
    }

    /// Continue from a previously stored state, for example when the boot hooks are called
    /// from separate entry points.
    pub fn with_state(mut self, state: BootState) -> Self {
        self.state = state;
        self
    }

    /// Endpoint table handed to the IPC pipe driver by the CM55 early init.
    pub fn with_ipc_endpoints(mut self, endpoints: &'static mut [IpcPipeEndpoint]) -> Self {
        match &mut self.sequence {
            Sequence::M55(seq) => seq.ipc_endpoints = Some(endpoints),
            _ => log::warn!("IPC endpoints are only used by the CM55 early init"),
        }
        self
    }

    #[inline]
    pub fn state(&self) -> BootState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &SocConfig {
        &self.config
    }

    #[inline]
    pub fn variant(&self) -> SocVariant {
        self.sequence.variant()
    }

    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    pub fn hook(&self) -> &F {
        &self.hook
    }

    /// Run the early init sequence of the variant. The state only advances on success.
    pub fn early_init(&mut self) -> Result<(), BootError> {
        if !self.state.can_transition(BootState::EarlyInitDone) {
            return Err(InvalidTransition {
                from: self.state,
                to: BootState::EarlyInitDone,
            }
            .into());
        }
        self.sequence
            .early_init(&mut self.port, &mut self.hook, &self.config)?;
        self.state.transition(BootState::EarlyInitDone)?;
        Ok(())
    }

    /// Bring up the fixed clock nodes with the PLL start policy of the configuration.
    pub fn init_clocks(&mut self, clocks: &[FixedClock]) -> Result<(), BootError> {
        for clock in clocks {
            clock
                .with_pll_start_policy(self.config.pll_start_policy)
                .init(&mut self.port, &mut self.hook)?;
        }
        Ok(())
    }

    /// Run the late init sequence of the variant. On the non-secure handoff variant, this
    /// does not return on hardware.
    pub fn late_init(&mut self) -> Result<(), BootError> {
        if self.state != BootState::EarlyInitDone {
            return Err(InvalidTransition {
                from: self.state,
                to: BootState::HandoffInProgress,
            }
            .into());
        }
        self.sequence
            .late_init(&mut self.port, &self.config, &mut self.state)
    }

    /// Release the CM55 from the configured XIP address. Does not return on hardware.
    pub fn start_cm55(&mut self) -> Result<(), BootError> {
        if !self.config.m55_enable {
            return Err(BootError::Cm55Disabled);
        }
        cm55::cm55_startup(&mut self.port, self.config.m55_xip_addr);
        Ok(())
    }

    /// Install a vendor interrupt handler through `sysint`.
    pub fn connect_interrupt(
        &mut self,
        sysint: &SysInt,
        config: Option<&SysIntConfig>,
        isr: IsrAddress,
    ) -> Result<(), BootError> {
        sysint.init(&mut self.port, config, isr)?;
        Ok(())
    }

    pub fn release(self) -> (P, F) {
        (self.port, self.hook)
    }
}
