//! # Secure to non-secure handoff
//!
//! The secure CM33 configures the security attribution and protection units, powers the memories
//! used by the other images and then calls the reset handler of the non-secure image. On
//! hardware, the call never returns.
use pse84_hal::{
    peri::{CM55_TCM_512K, MmioSlave, SMIF0, SMIF01},
    port::{PlatformPort, Ppc},
    power::PdcmId,
};

use crate::{
    config::SocConfig,
    image::BootImageDescriptor,
    state::{BootState, InvalidTransition},
};

/// Slaves released for the non-secure image and the CM55.
pub const NS_MMIO_SLAVES: [MmioSlave; 3] = [CM55_TCM_512K, SMIF0, SMIF01];

/// Hand the CM33 over to the non-secure image.
///
/// `state` moves to [BootState::HandoffInProgress] before the first step and to
/// [BootState::Transferred] right before the non-secure call. The handoff can only run once,
/// after early init.
pub fn cm33_ns_startup<P: PlatformPort + ?Sized>(
    port: &mut P,
    config: &SocConfig,
    state: &mut BootState,
) -> Result<(), InvalidTransition> {
    state.transition(BootState::HandoffInProgress)?;
    log::info!("CM33 non-secure handoff");

    port.sau_init();
    port.scb_setup();
    port.nvic_ns_setup();
    if config.fpu_ns_enabled() {
        port.fpu_ns_init();
    }

    port.enable_irq();

    port.enable_pd1();
    for slave in NS_MMIO_SLAVES {
        port.peri_group_slave_init(slave);
    }
    port.enable_socmem(true);

    port.mpc_init();

    let image = BootImageDescriptor::read(port, config.boot_image_addr);
    log::debug!(
        "non-secure image at {:#010x}: sp {:#010x}, reset handler {:#010x}",
        config.boot_image_addr,
        image.stack_pointer,
        image.reset_handler
    );
    port.set_msp_ns(image.stack_pointer);

    // Shortens the deep sleep wakeup time.
    port.clear_pd_dependency(PdcmId::AppCpuSs, PdcmId::SysCpu);
    // Set by the boot ROM.
    port.clear_pd_dependency(PdcmId::AppCpu, PdcmId::SysCpu);

    port.ppc_init(Ppc::Ppc0);
    port.ppc_init(Ppc::Ppc1);

    port.disable_systick();

    state.transition(BootState::Transferred)?;
    port.call_non_secure(image.reset_handler);
    port.park();
    Ok(())
}
