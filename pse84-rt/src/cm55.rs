//! # CM55 bring-up
use pse84_hal::{
    port::{CorePort, PowerPort},
    power::{CM55_BOOT_WAIT_TIME, DeepSleepMode},
};

/// Release the CM55 with the vector table at `xip_addr` and configure the idle power modes of
/// the system and SOCMEM domains. Parks the calling core afterwards.
pub fn cm55_startup<P: PowerPort + CorePort + ?Sized>(port: &mut P, xip_addr: u32) {
    log::info!("starting CM55 from {xip_addr:#010x}");
    port.enable_cm55(xip_addr, CM55_BOOT_WAIT_TIME);
    port.set_deep_sleep_mode(DeepSleepMode::DeepSleep);
    port.set_socmem_deep_sleep_mode(DeepSleepMode::DeepSleep);
    port.park();
}
