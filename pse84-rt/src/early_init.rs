//! # Early init sequences
//!
//! Run once before any driver is initialized.
use pse84::pdl::IpcPipeEndpoint;
use pse84_hal::{
    clocks::{ClkHf, ClkHfDivider, ClkPath, ClockStartupError, SysClkError},
    fatal::FatalHook,
    mpu::XN_CLEAR_REGION_COUNT,
    peri::{
        PERI0_GROUP1, PERI0_GROUP2, PERI0_GROUP3, PERI0_GROUP4, PERI1_GROUP0, PERI1_GROUP1,
        PERI1_GROUP2, PeriGroup, SlaveCtl,
    },
    port::{CachePort, ClockPort, CorePort, ProtectionPort},
};

use crate::config::SocConfig;

/// High-frequency roots enabled on the secure core, in order.
///
/// `CLK_HF11` feeds the SYS_MMIO_3 group and must run before the group is released. `CLK_HF3`
/// and `CLK_HF4` feed the serial memory interfaces.
pub const CLK_HF_ROOTS: [ClkHf; 3] = [ClkHf::HF11, ClkHf::HF3, ClkHf::HF4];

const ALL_SLAVES: u32 = 0xFFFF_FFFF;

/// Peripheral group release sequence of the secure core.
///
/// Group 0 of both PERI instances stays in reset.
pub const PERI_GROUP_RELEASE: [(PeriGroup, SlaveCtl, u32); 13] = [
    (PERI0_GROUP1, SlaveCtl::Reset, 0),
    (PERI0_GROUP2, SlaveCtl::Reset, 0),
    // NNLite
    (PERI0_GROUP4, SlaveCtl::Reset, 0),
    (PERI0_GROUP1, SlaveCtl::ClockEnable, ALL_SLAVES),
    (PERI0_GROUP2, SlaveCtl::ClockEnable, ALL_SLAVES),
    (PERI0_GROUP4, SlaveCtl::ClockEnable, 0x1),
    (PERI0_GROUP3, SlaveCtl::ClockEnable, ALL_SLAVES),
    // CM33 non-secure and CM55 setup.
    (PERI1_GROUP2, SlaveCtl::ClockEnable, 0x3),
    (PERI1_GROUP1, SlaveCtl::Reset, 0),
    (PERI1_GROUP2, SlaveCtl::Reset, 0),
    (PERI1_GROUP0, SlaveCtl::ClockEnable, ALL_SLAVES),
    (PERI1_GROUP1, SlaveCtl::ClockEnable, ALL_SLAVES),
    (PERI1_GROUP2, SlaveCtl::ClockEnable, ALL_SLAVES),
];

fn enable_clk_hf_roots<P: ClockPort + ?Sized>(port: &mut P) -> Result<(), SysClkError> {
    for clk_hf in CLK_HF_ROOTS {
        log::debug!("enabling CLK_HF{}", clk_hf.raw());
        port.clk_hf_set_source(clk_hf, ClkPath::PATH0)?;
        port.clk_hf_set_divider(clk_hf, ClkHfDivider::NoDivide)?;
        port.clk_hf_enable(clk_hf)?;
    }
    Ok(())
}

fn release_peri_groups<P: ClockPort + ?Sized>(port: &mut P) -> Result<(), SysClkError> {
    for (group, reg, value) in PERI_GROUP_RELEASE {
        port.peri_group_set_slave_ctl(group, reg, value)?;
    }
    Ok(())
}

/// Early init of the secure CM33: clock roots, peripheral group release and vendor system
/// initialization.
pub fn m33_secure<P: ClockPort + ?Sized, F: FatalHook + ?Sized>(
    port: &mut P,
    hook: &mut F,
) -> Result<(), ClockStartupError> {
    log::info!("CM33 secure early init");
    if let Err(e) = enable_clk_hf_roots(port) {
        log::error!("enabling high-frequency clock roots failed: {e}");
        hook.clock_startup_error(ClockStartupError::ClkHf);
        return Err(ClockStartupError::ClkHf);
    }
    if let Err(e) = release_peri_groups(port) {
        log::error!("releasing peripheral groups failed: {e}");
        hook.clock_startup_error(ClockStartupError::PeriGroup);
        return Err(ClockStartupError::PeriGroup);
    }
    port.system_init();
    Ok(())
}

/// Early init of the CM55.
///
/// The shared SRAM area is mapped non-cacheable before the caches are enabled.
pub fn m55<P: ClockPort + ProtectionPort + CachePort + CorePort + ?Sized>(
    port: &mut P,
    config: &SocConfig,
    ipc_endpoints: &'static mut [IpcPipeEndpoint],
) {
    log::info!("CM55 early init");
    port.configure_mpu_region(&config.shared_region);
    if config.clear_mpu_xn {
        port.clear_mpu_execute_never(XN_CLEAR_REGION_COUNT);
    }

    port.barrier();
    port.enable_icache();
    port.enable_dcache();

    port.system_init();

    log::debug!("configuring IPC pipe with {} endpoints", ipc_endpoints.len());
    port.ipc_pipe_config(ipc_endpoints);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pse84::pdl::CY_IPC_MAX_ENDPOINTS;
    use pse84_hal::{
        mpu::SHARED_SRAM1_REGION,
        port::recorder::{Call, CallRecorder, RecordingHook},
    };
    use static_cell::StaticCell;

    use crate::config::SocVariant;

    fn is_peri_call(call: &Call) -> bool {
        matches!(call, Call::PeriGroupSetSlaveCtl(..))
    }

    #[test]
    fn test_m33_sequence() {
        let mut port = CallRecorder::new();
        let mut hook = RecordingHook::new();
        m33_secure(&mut port, &mut hook).unwrap();
        let calls = port.calls();
        assert_eq!(calls.len(), 9 + 13 + 1);
        let mut clk_hf_calls = [Call::SystemInit; 9];
        for (i, clk_hf) in [ClkHf::HF11, ClkHf::HF3, ClkHf::HF4].into_iter().enumerate() {
            clk_hf_calls[i * 3] = Call::ClkHfSetSource(clk_hf, ClkPath::PATH0);
            clk_hf_calls[i * 3 + 1] = Call::ClkHfSetDivider(clk_hf, ClkHfDivider::NoDivide);
            clk_hf_calls[i * 3 + 2] = Call::ClkHfEnable(clk_hf);
        }
        assert_eq!(&calls[0..9], &clk_hf_calls);
        assert_eq!(
            &calls[9..22],
            &[
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP1, SlaveCtl::Reset, 0),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP2, SlaveCtl::Reset, 0),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP4, SlaveCtl::Reset, 0),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP1, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP2, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP4, SlaveCtl::ClockEnable, 0x1),
                Call::PeriGroupSetSlaveCtl(PERI0_GROUP3, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP2, SlaveCtl::ClockEnable, 0x3),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP1, SlaveCtl::Reset, 0),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP2, SlaveCtl::Reset, 0),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP0, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP1, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
                Call::PeriGroupSetSlaveCtl(PERI1_GROUP2, SlaveCtl::ClockEnable, 0xFFFF_FFFF),
            ]
        );
        assert_eq!(calls[22], Call::SystemInit);
        assert!(hook.errors().is_empty());
    }

    #[test]
    fn test_clk_hf11_before_peri_groups() {
        let mut port = CallRecorder::new();
        m33_secure(&mut port, &mut RecordingHook::new()).unwrap();
        let hf11 = port.position(&Call::ClkHfEnable(ClkHf::HF11)).unwrap();
        let first_peri = port.calls().iter().position(is_peri_call).unwrap();
        assert!(hf11 < first_peri);
    }

    #[test]
    fn test_group0_stays_in_reset() {
        let mut port = CallRecorder::new();
        m33_secure(&mut port, &mut RecordingHook::new()).unwrap();
        for call in port.calls() {
            if let Call::PeriGroupSetSlaveCtl(group, SlaveCtl::Reset, _) = call {
                assert_ne!(group.group(), 0);
            }
        }
    }

    #[test]
    fn test_clk_hf_failure_is_fatal() {
        let mut port = CallRecorder::new()
            .with_failure(Call::ClkHfEnable(ClkHf::HF3), SysClkError::InvalidState);
        let mut hook = RecordingHook::new();
        assert_eq!(
            m33_secure(&mut port, &mut hook),
            Err(ClockStartupError::ClkHf)
        );
        assert_eq!(hook.errors(), &[ClockStartupError::ClkHf]);
        assert_eq!(port.calls().last(), Some(&Call::ClkHfEnable(ClkHf::HF3)));
        assert!(!port.calls().iter().any(is_peri_call));
        assert!(!port.contains(&Call::SystemInit));
    }

    #[test]
    fn test_peri_group_failure_is_fatal() {
        let failing = Call::PeriGroupSetSlaveCtl(PERI1_GROUP2, SlaveCtl::ClockEnable, 0x3);
        let mut port = CallRecorder::new().with_failure(failing, SysClkError::BadParam);
        let mut hook = RecordingHook::new();
        assert_eq!(
            m33_secure(&mut port, &mut hook),
            Err(ClockStartupError::PeriGroup)
        );
        assert_eq!(hook.errors()[0].code(), 6);
        assert_eq!(port.calls().last(), Some(&failing));
        assert!(!port.contains(&Call::SystemInit));
    }

    #[test]
    fn test_m55_sequence() {
        static ENDPOINTS: StaticCell<[IpcPipeEndpoint; CY_IPC_MAX_ENDPOINTS]> = StaticCell::new();
        let endpoints = ENDPOINTS.init([IpcPipeEndpoint::EMPTY; CY_IPC_MAX_ENDPOINTS]);
        let mut port = CallRecorder::new();
        let config = SocConfig::new(SocVariant::M55);
        m55(&mut port, &config, endpoints);
        assert_eq!(
            port.calls(),
            &[
                Call::ConfigureMpuRegion(SHARED_SRAM1_REGION),
                Call::Barrier,
                Call::EnableICache,
                Call::EnableDCache,
                Call::SystemInit,
                Call::IpcPipeConfig(8),
            ]
        );
    }

    #[test]
    fn test_m55_clear_xn_before_caches() {
        static ENDPOINTS: StaticCell<[IpcPipeEndpoint; CY_IPC_MAX_ENDPOINTS]> = StaticCell::new();
        let endpoints = ENDPOINTS.init([IpcPipeEndpoint::EMPTY; CY_IPC_MAX_ENDPOINTS]);
        let mut port = CallRecorder::new();
        let config = SocConfig::new(SocVariant::M55).with_clear_mpu_xn(true);
        m55(&mut port, &config, endpoints);
        let region = port
            .position(&Call::ConfigureMpuRegion(SHARED_SRAM1_REGION))
            .unwrap();
        let xn = port.position(&Call::ClearMpuExecuteNever(8)).unwrap();
        let dcache = port.position(&Call::EnableDCache).unwrap();
        assert!(region < xn);
        assert!(xn < dcache);
    }
}
