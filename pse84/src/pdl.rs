//! # Vendor peripheral driver library (PDL) C ABI
//!
//! Raw status codes, configuration structures and function declarations of the PSE84 peripheral
//! driver library and of the configuration code generated for the secure project (SAU, MPC, PPC
//! and NVIC tables). The HAL only ever calls into these through its production platform port.
//!
//! Enumeration values mirror the PDL headers and must be kept in sync with the linked PDL
//! version.
#![allow(non_snake_case)]

/// Driver identifier of the SysClk driver, `CY_PDL_DRV_ID(0x12)`.
pub const CY_SYSCLK_ID: u32 = 0x12 << 18;
/// Status class bits of an error status, `CY_PDL_STATUS_ERROR`.
pub const CY_PDL_STATUS_ERROR: u32 = 2 << 16;

pub const CY_SYSCLK_SUCCESS: u32 = 0;
pub const CY_SYSCLK_BAD_PARAM: u32 = CY_SYSCLK_ID | CY_PDL_STATUS_ERROR | 1;
pub const CY_SYSCLK_TIMEOUT: u32 = CY_SYSCLK_ID | CY_PDL_STATUS_ERROR | 2;
pub const CY_SYSCLK_INVALID_STATE: u32 = CY_SYSCLK_ID | CY_PDL_STATUS_ERROR | 3;
pub const CY_SYSCLK_UNSUPPORTED_STATE: u32 = CY_SYSCLK_ID | CY_PDL_STATUS_ERROR | 4;

/// Driver identifier of the SysInt driver, `CY_PDL_DRV_ID(0x15)`.
pub const CY_SYSINT_ID: u32 = 0x15 << 18;

pub const CY_SYSINT_SUCCESS: u32 = 0;
pub const CY_SYSINT_BAD_PARAM: u32 = CY_SYSINT_ID | CY_PDL_STATUS_ERROR | 1;

/// Number of endpoints of the system IPC pipe.
pub const CY_IPC_MAX_ENDPOINTS: usize = 8;

/// Raw layout of `cy_stc_dpll_hp_config_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpllHpConfigRaw {
    pub p_div: u8,
    pub n_div: u8,
    pub k_div: u8,
    pub n_div_fract: u32,
    pub freq_mode_sel: u32,
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
    pub output_mode: u32,
}

/// Raw layout of `cy_stc_pll_manual_config_t`.
#[repr(C)]
#[derive(Debug)]
pub struct PllManualConfigRaw {
    /// Unused on the high-performance DPLL path.
    pub lp_pll_cfg: *const core::ffi::c_void,
    pub hp_pll_cfg: *const DpllHpConfigRaw,
}

/// Storage for one `cy_stc_ipc_pipe_ep_t` endpoint descriptor.
///
/// The structure is only ever written by the PDL, so it is kept opaque here. It is sized
/// generously to cover all PDL revisions for this device.
#[repr(C, align(4))]
#[derive(Debug, Clone, Copy)]
pub struct IpcPipeEndpoint {
    _opaque: [u32; 16],
}

impl IpcPipeEndpoint {
    pub const EMPTY: Self = Self { _opaque: [0; 16] };
}

impl Default for IpcPipeEndpoint {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Interrupt service routine address, `cy_israddress`.
pub type IsrAddress = Option<unsafe extern "C" fn()>;

/// Raw layout of `cy_stc_sysint_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysIntConfigRaw {
    pub intr_src: u32,
    pub intr_priority: u32,
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
unsafe extern "C" {
    // Clock tree.
    pub fn Cy_SysClk_ClkHfSetSource(clk_hf: u32, source: u32) -> u32;
    pub fn Cy_SysClk_ClkHfSetDivider(clk_hf: u32, divider: u32) -> u32;
    pub fn Cy_SysClk_ClkHfEnable(clk_hf: u32) -> u32;
    pub fn Cy_SysClk_PeriGroupSetSlaveCtl(group_num: u32, slave_ctl: u32, value: u32) -> u32;
    pub fn Cy_SysClk_PeriGroupSlaveInit(peri_nr: u32, group_nr: u32, slave_nr: u32, clk_hf_nr: u32);
    pub fn Cy_SysClk_PllIsEnabled(clk_path: u32) -> bool;
    pub fn Cy_SysClk_PllDisable(clk_path: u32) -> u32;
    pub fn Cy_SysClk_PllManualConfigure(clk_path: u32, config: *const PllManualConfigRaw) -> u32;
    pub fn Cy_SysClk_PllEnable(clk_path: u32, timeout_us: u32) -> u32;
    pub fn Cy_SysClk_IhoEnable();
    pub fn Cy_SysClk_PiloEnable();
    pub fn SystemCoreClockUpdate();
    pub fn SystemInit();

    // Power.
    pub fn Cy_System_EnablePD1();
    pub fn Cy_SysEnableSOCMEM(enable: bool);
    pub fn cy_pd_pdcm_clear_dependency(host_pd: u32, dest_pd: u32);
    pub fn Cy_SysEnableCM55(base: *mut core::ffi::c_void, vector_table: u32, wait_us: u32);
    pub fn Cy_SysPm_SetDeepSleepMode(mode: u32) -> u32;
    pub fn Cy_SysPm_SetSOCMEMDeepSleepMode(mode: u32) -> u32;

    // Generated security configuration.
    pub fn cy_sau_init();
    pub fn SysCtrlBlk_Setup();
    pub fn NVIC_NS_Setup();
    pub fn initFPU();
    pub fn cy_mpc_Init();
    pub fn cy_ppc0_Init();
    pub fn cy_ppc1_Init();

    // Inter-processor communication.
    pub fn Cy_IPC_Pipe_Config(endpoints: *mut IpcPipeEndpoint);

    // Host operating system services.
    pub fn irq_connect_dynamic(
        irq: u32,
        priority: u32,
        routine: unsafe extern "C" fn(*const core::ffi::c_void),
        parameter: *const core::ffi::c_void,
        flags: u32,
    ) -> i32;
}

static_assertions::const_assert_eq!(CY_SYSCLK_BAD_PARAM, 0x004A_0001);
