//! # C ABI hooks
//!
//! Entry points called by the host operating system and the vendor middleware. The boot state
//! is kept across the separate entry points in a global.
#![allow(non_snake_case)]
use core::cell::Cell;

use critical_section::Mutex;
use pse84::pdl::{
    CY_IPC_MAX_ENDPOINTS, CY_SYSINT_SUCCESS, IpcPipeEndpoint, IsrAddress, SysIntConfigRaw,
};
use pse84_hal::{
    clocks::ClockStartupError,
    fatal::{FatalHook, HaltForever},
    port::Pse84Port,
    sysint::{SysInt, SysIntConfig},
};
use static_cell::StaticCell;

use crate::{Boot, BootState, SocConfig, SocVariant, config::FIXED_CLOCKS};

const CONFIG: SocConfig = SocConfig::from_features();
const SYSINT: SysInt = SysInt::new();

static BOOT_STATE: Mutex<Cell<BootState>> = Mutex::new(Cell::new(BootState::NotStarted));
static IPC_ENDPOINTS: StaticCell<[IpcPipeEndpoint; CY_IPC_MAX_ENDPOINTS]> = StaticCell::new();

fn boot() -> Boot<Pse84Port> {
    let state = critical_section::with(|cs| BOOT_STATE.borrow(cs).get());
    // Safety: The hooks are called one after another by the host operating system, before its
    // scheduler runs.
    Boot::new(unsafe { Pse84Port::steal() }, CONFIG).with_state(state)
}

fn store_state(state: BootState) {
    critical_section::with(|cs| BOOT_STATE.borrow(cs).set(state));
}

#[unsafe(no_mangle)]
pub extern "C" fn soc_early_init_hook() {
    pse84_hal::log::rb::init(log::LevelFilter::Debug);
    let mut boot = boot();
    if CONFIG.variant == SocVariant::M55
        && let Some(endpoints) =
            IPC_ENDPOINTS.try_init([IpcPipeEndpoint::EMPTY; CY_IPC_MAX_ENDPOINTS])
    {
        boot = boot.with_ipc_endpoints(endpoints);
    }
    if let Err(e) = boot.early_init() {
        log::error!("early init failed: {e}");
    }
    store_state(boot.state());
}

#[unsafe(no_mangle)]
pub extern "C" fn soc_late_init_hook() {
    let mut boot = boot();
    if let Err(e) = boot.late_init() {
        log::error!("late init failed: {e}");
    }
    store_state(boot.state());
}

/// Initialize the fixed clock nodes of the board. Always returns 0.
#[unsafe(no_mangle)]
pub extern "C" fn ifx_pse84_fixed_clocks_init() -> i32 {
    let mut boot = boot();
    if let Err(e) = boot.init_clocks(FIXED_CLOCKS) {
        log::error!("fixed clock init failed: {e}");
    }
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn ifx_pse84_cm33_ns_startup() {
    let mut boot = boot();
    // The handoff is also reachable directly, keep the state machine consistent.
    let result = boot.late_init();
    store_state(boot.state());
    if let Err(e) = result {
        log::error!("non-secure handoff failed: {e}");
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn ifx_pse84_cm55_startup() {
    let mut boot = boot();
    if let Err(e) = boot.start_cm55() {
        log::error!("CM55 startup failed: {e}");
    }
}

/// # Safety
///
/// `config` must be null or point to a valid interrupt configuration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Cy_SysInt_Init(config: *const SysIntConfigRaw, isr: IsrAddress) -> u32 {
    let config = unsafe { config.as_ref() }.map(|raw| SysIntConfig::from(*raw));
    // Safety: Only the dynamic interrupt API of the host operating system is used.
    let mut port = unsafe { Pse84Port::steal() };
    match SYSINT.init(&mut port, config.as_ref(), isr) {
        Ok(()) => CY_SYSINT_SUCCESS,
        Err(e) => {
            log::warn!("interrupt configuration failed: {e}");
            e.code()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Cy_SysInt_SetVector(irq: i32, isr: IsrAddress) -> IsrAddress {
    SYSINT.set_vector(irq as u32, isr)
}

/// Called by vendor clock configuration code when the clock tree can not be started.
#[unsafe(no_mangle)]
pub extern "C" fn cycfg_ClockStartupError(error: u32) {
    match ClockStartupError::try_from(error) {
        Ok(error) => HaltForever.clock_startup_error(error),
        Err(_) => {
            log::error!("unknown clock startup error {error}");
            HaltForever::halt()
        }
    }
}
