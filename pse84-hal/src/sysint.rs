//! # Interrupt vector redirection
//!
//! Vendor middleware installs its interrupt handlers through `Cy_SysInt_Init` and
//! `Cy_SysInt_SetVector`. On this platform the vector table is owned by the host operating
//! system, so handler installation is redirected to its dynamic interrupt API. Without dynamic
//! interrupt support, the requests are accepted and ignored.
use pse84::pdl::{CY_SYSINT_BAD_PARAM, IsrAddress, SysIntConfigRaw};

use crate::port::CorePort;

/// Lowest usable IRQ priority with 3 priority bits. The lowest hardware level is reserved for
/// the context switch exception of the host operating system.
pub const IRQ_PRIO_LOWEST: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysIntConfig {
    pub intr_src: u32,
    pub intr_priority: u32,
}

impl From<SysIntConfigRaw> for SysIntConfig {
    fn from(raw: SysIntConfigRaw) -> Self {
        Self {
            intr_src: raw.intr_src,
            intr_priority: raw.intr_priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SysIntError {
    #[error("missing interrupt configuration")]
    BadParam,
}

impl SysIntError {
    /// Raw `cy_en_sysint_status_t` value.
    pub const fn code(&self) -> u32 {
        match self {
            SysIntError::BadParam => CY_SYSINT_BAD_PARAM,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SysInt {
    lowest_priority: u32,
    dynamic: bool,
}

impl Default for SysInt {
    fn default() -> Self {
        Self::new()
    }
}

impl SysInt {
    /// Dynamic interrupt support follows the `dynamic-interrupts` feature.
    pub const fn new() -> Self {
        Self {
            lowest_priority: IRQ_PRIO_LOWEST,
            dynamic: cfg!(feature = "dynamic-interrupts"),
        }
    }

    pub const fn with_lowest_priority(mut self, lowest_priority: u32) -> Self {
        self.lowest_priority = lowest_priority;
        self
    }

    pub const fn with_dynamic_interrupts(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    #[inline]
    pub const fn clamp_priority(&self, priority: u32) -> u32 {
        if priority > self.lowest_priority {
            self.lowest_priority
        } else {
            priority
        }
    }

    /// Install `isr` for the interrupt described by `config`.
    ///
    /// The priority is clamped to [Self::clamp_priority], because the host operating system
    /// rejects handlers at the priority of its context switch exception.
    pub fn init<P: CorePort + ?Sized>(
        &self,
        port: &mut P,
        config: Option<&SysIntConfig>,
        isr: IsrAddress,
    ) -> Result<(), SysIntError> {
        if !self.dynamic {
            return Ok(());
        }
        let config = config.ok_or(SysIntError::BadParam)?;
        let priority = self.clamp_priority(config.intr_priority);
        if priority != config.intr_priority {
            log::debug!(
                "IRQ {} priority {} clamped to {}",
                config.intr_src,
                config.intr_priority,
                priority
            );
        }
        port.connect_dynamic_irq(config.intr_src, priority, isr);
        Ok(())
    }

    /// Vector table entries are not exposed. The previous vector is always reported as absent.
    pub fn set_vector(&self, irq: u32, _isr: IsrAddress) -> IsrAddress {
        log::trace!("ignoring vector update for IRQ {irq}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::recorder::{Call, CallRecorder};

    unsafe extern "C" fn dummy_isr() {}

    const DYNAMIC: SysInt = SysInt::new().with_dynamic_interrupts(true);

    #[test]
    fn test_priority_clamped() {
        let mut port = CallRecorder::new();
        let config = SysIntConfig {
            intr_src: 42,
            intr_priority: 7,
        };
        DYNAMIC
            .init(&mut port, Some(&config), Some(dummy_isr))
            .unwrap();
        assert_eq!(
            port.calls(),
            &[Call::ConnectDynamicIrq {
                irq: 42,
                priority: IRQ_PRIO_LOWEST,
                has_isr: true
            }]
        );
    }

    #[test]
    fn test_priority_kept() {
        let mut port = CallRecorder::new();
        let config = SysIntConfig {
            intr_src: 3,
            intr_priority: 2,
        };
        DYNAMIC
            .init(&mut port, Some(&config), Some(dummy_isr))
            .unwrap();
        assert_eq!(
            port.calls(),
            &[Call::ConnectDynamicIrq {
                irq: 3,
                priority: 2,
                has_isr: true
            }]
        );
    }

    #[test]
    fn test_missing_config() {
        let mut port = CallRecorder::new();
        assert_eq!(
            DYNAMIC.init(&mut port, None, Some(dummy_isr)),
            Err(SysIntError::BadParam)
        );
        assert!(port.calls().is_empty());
        assert_eq!(SysIntError::BadParam.code(), 0x0056_0001);
    }

    #[test]
    fn test_static_vectors_noop() {
        let mut port = CallRecorder::new();
        let sysint = SysInt::new().with_dynamic_interrupts(false);
        assert_eq!(sysint.init(&mut port, None, None), Ok(()));
        assert!(port.calls().is_empty());
    }

    #[test]
    fn test_set_vector() {
        assert!(DYNAMIC.set_vector(5, Some(dummy_isr)).is_none());
    }
}
