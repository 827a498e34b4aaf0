//! Clock module.
//!
//! Identifiers for the high-frequency clock roots and clock paths, the static DPLL configuration
//! record and the status and error types of the clock tree primitives.
use pse84::pdl::{
    CY_PDL_STATUS_ERROR, CY_SYSCLK_BAD_PARAM, CY_SYSCLK_ID, CY_SYSCLK_INVALID_STATE,
    CY_SYSCLK_SUCCESS, CY_SYSCLK_TIMEOUT, CY_SYSCLK_UNSUPPORTED_STATE, DpllHpConfigRaw,
};

use crate::time::{Hertz, Microseconds};

/// High-frequency clock root (`CLK_HF<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClkHf(u8);

impl ClkHf {
    /// Feeds the SYS_MMIO_3 peripheral group.
    pub const HF11: Self = Self(11);
    /// Feeds the SMIF0 serial memory interface.
    pub const HF3: Self = Self(3);
    /// Feeds the SMIF1 serial memory interface.
    pub const HF4: Self = Self(4);

    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0 as u32
    }
}

/// Clock path, the input of a high-frequency root or the path driven by a PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClkPath(u8);

impl ClkPath {
    pub const PATH0: Self = Self(0);
    /// Path driven by the high-performance DPLL instance 0.
    pub const DPLL_HP0: Self = Self(3);

    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0 as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ClkHfDivider {
    NoDivide = 0,
    DivideBy2 = 1,
    DivideBy3 = 2,
    DivideBy4 = 3,
}

/// Clock source selector of a fixed-rate clock node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum SystemClock {
    /// Internal main oscillator.
    Imo = 0,
    /// Frequency locked loop.
    Fll = 1,
    /// Internal high-speed oscillator.
    Iho = 2,
    /// Precision internal low-power oscillator.
    Pilo = 3,
    /// High-performance DPLL, 500 MHz path.
    Dpll500 = 4,
    Eco = 5,
    Wco = 6,
    DpllLp0 = 7,
    DpllLp1 = 8,
}

/// Input frequency range selection of the DPLL lock detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DpllFreqMode {
    Clk4MHz1UsCntVal = 0,
    Clk10MHz1UsCntVal = 1,
    Clk15MHz1UsCntVal = 2,
    Clk20MHz1UsCntVal = 3,
    Clk30MHz1UsCntVal = 4,
    Clk40MHz1UsCntVal = 5,
    Clk45MHz1UsCntVal = 6,
    Clk50MHz1UsCntVal = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PllOutputMode {
    /// Output the PLL clock once it is locked, the reference clock otherwise.
    Auto = 0,
    /// Output the PLL clock when locked, and a low value otherwise.
    LockedOrLow = 1,
    /// Always output the PLL reference clock.
    Input = 2,
    /// Always output the PLL clock.
    Output = 3,
}

/// Static configuration record of the high-performance DPLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpllHpConfig {
    pub p_div: u8,
    pub n_div: u8,
    pub k_div: u8,
    pub n_div_fract: u32,
    pub freq_mode_sel: DpllFreqMode,
    pub ivr_trim: u8,
    pub clkr_sel: bool,
    pub alpha_coarse: u8,
    pub beta_coarse: u8,
    pub flock_thresh: u8,
    pub flock_wait: u8,
    pub flock_lk_thres: u8,
    pub flock_lk_wait: u8,
    pub alpha_ext: u8,
    pub beta_ext: u8,
    pub lf_en: bool,
    pub dc_en: bool,
    pub output_mode: PllOutputMode,
}

impl DpllHpConfig {
    pub const fn to_raw(&self) -> DpllHpConfigRaw {
        DpllHpConfigRaw {
            p_div: self.p_div,
            n_div: self.n_div,
            k_div: self.k_div,
            n_div_fract: self.n_div_fract,
            freq_mode_sel: self.freq_mode_sel as u32,
            ivr_trim: self.ivr_trim,
            clkr_sel: self.clkr_sel,
            alpha_coarse: self.alpha_coarse,
            beta_coarse: self.beta_coarse,
            flock_thresh: self.flock_thresh,
            flock_wait: self.flock_wait,
            flock_lk_thres: self.flock_lk_thres,
            flock_lk_wait: self.flock_lk_wait,
            alpha_ext: self.alpha_ext,
            beta_ext: self.beta_ext,
            lf_en: self.lf_en,
            dc_en: self.dc_en,
            output_mode: self.output_mode as u32,
        }
    }
}

/// Configuration of the 500 MHz high-performance DPLL path.
pub const PLL500M_CONFIG: DpllHpConfig = DpllHpConfig {
    p_div: 0,
    n_div: 15,
    k_div: 1,
    n_div_fract: 0,
    freq_mode_sel: DpllFreqMode::Clk50MHz1UsCntVal,
    ivr_trim: 0x8,
    clkr_sel: true,
    alpha_coarse: 0xC,
    beta_coarse: 0x5,
    flock_thresh: 0x3,
    flock_wait: 0x6,
    flock_lk_thres: 0x7,
    flock_lk_wait: 0x4,
    alpha_ext: 0x14,
    beta_ext: 0x14,
    lf_en: true,
    dc_en: true,
    output_mode: PllOutputMode::Auto,
};

/// Nominal output rate of [PLL500M_CONFIG].
pub const PLL500M_RATE: Hertz = Hertz::from_raw(500_000_000);

/// Lock timeout passed to the PLL enable primitive.
pub const PLL_ENABLE_TIMEOUT: Microseconds = Microseconds::from_ticks(10_000);

/// Failure status of a SysClk driver primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum SysClkError {
    #[error("invalid clock parameter")]
    BadParam = CY_SYSCLK_BAD_PARAM,
    #[error("clock operation timed out")]
    Timeout = CY_SYSCLK_TIMEOUT,
    #[error("clock in invalid state")]
    InvalidState = CY_SYSCLK_INVALID_STATE,
    #[error("unsupported clock state")]
    UnsupportedState = CY_SYSCLK_UNSUPPORTED_STATE,
    #[error("unknown clock status")]
    #[num_enum(default)]
    Unknown = CY_SYSCLK_ID | CY_PDL_STATUS_ERROR | 0xFF,
}

impl SysClkError {
    /// Converts a raw `cy_en_sysclk_status_t` into a result.
    pub fn check(status: u32) -> Result<(), SysClkError> {
        if status == CY_SYSCLK_SUCCESS {
            return Ok(());
        }
        Err(SysClkError::try_from(status).unwrap_or(SysClkError::Unknown))
    }
}

/// Code handed to the fatal hook when the clock tree can not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum ClockStartupError {
    #[error("external crystal oscillator startup failed")]
    Eco = 1,
    #[error("watch crystal oscillator startup failed")]
    Wco = 2,
    #[error("PLL configuration or lock failed")]
    Pll = 3,
    #[error("FLL configuration or lock failed")]
    Fll = 4,
    #[error("high-frequency clock root configuration failed")]
    ClkHf = 5,
    #[error("peripheral group configuration failed")]
    PeriGroup = 6,
}

impl ClockStartupError {
    #[inline]
    pub const fn code(&self) -> u32 {
        *self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_success() {
        assert_eq!(SysClkError::check(CY_SYSCLK_SUCCESS), Ok(()));
    }

    #[test]
    fn test_status_timeout() {
        assert_eq!(
            SysClkError::check(CY_SYSCLK_TIMEOUT),
            Err(SysClkError::Timeout)
        );
    }

    #[test]
    fn test_status_unknown() {
        assert_eq!(SysClkError::check(0x1234), Err(SysClkError::Unknown));
    }

    #[test]
    fn test_pll_error_code() {
        assert_eq!(ClockStartupError::Pll.code(), 3);
        assert_eq!(ClockStartupError::try_from(6u32).ok(), Some(ClockStartupError::PeriGroup));
        assert!(ClockStartupError::try_from(0u32).is_err());
    }

    #[test]
    fn test_pll500_raw_record() {
        let raw = PLL500M_CONFIG.to_raw();
        assert_eq!(raw.n_div, 15);
        assert_eq!(raw.k_div, 1);
        assert_eq!(raw.freq_mode_sel, 7);
        assert_eq!(raw.alpha_coarse, 0xC);
        assert_eq!(raw.beta_coarse, 0x5);
        assert_eq!(raw.flock_lk_thres, 0x7);
        assert_eq!(raw.output_mode, 0);
    }

    #[test]
    fn test_system_clock_from_raw() {
        assert_eq!(SystemClock::try_from(4u32).ok(), Some(SystemClock::Dpll500));
        assert!(SystemClock::try_from(42u32).is_err());
    }
}
