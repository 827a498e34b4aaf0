//! Production platform port backed by the vendor driver library and the core registers.
use core::ffi::c_void;

use pse84::{
    memmap::MXCM55_BASE,
    mpu::{Mpu, MmioMpu},
    pdl::{self, IpcPipeEndpoint, IsrAddress, PllManualConfigRaw},
    systick::{MmioSysTick, SysTick},
};

use super::{CachePort, ClockPort, CorePort, Ppc, PowerPort, ProtectionPort};
use crate::{
    clocks::{ClkHf, ClkHfDivider, ClkPath, DpllHpConfig, SysClkError},
    mpu::{self, MpuRegion},
    peri::{MmioSlave, PeriGroup, SlaveCtl},
    power::{DeepSleepMode, PdcmId},
    time::Microseconds,
};

pub struct Pse84Port {
    mpu: MmioMpu<'static>,
    systick: MmioSysTick<'static>,
}

impl Pse84Port {
    /// Create the production port.
    ///
    /// # Safety
    ///
    /// This steals the MPU and SysTick register blocks and allows calling into the vendor
    /// driver library. Only one instance may exist, and it may only be used before the
    /// scheduler of the host operating system is running.
    pub unsafe fn steal() -> Self {
        Self {
            mpu: unsafe { Mpu::new_mmio_fixed() },
            systick: unsafe { SysTick::new_mmio_fixed() },
        }
    }
}

impl ClockPort for Pse84Port {
    fn clk_hf_set_source(&mut self, clk_hf: ClkHf, path: ClkPath) -> Result<(), SysClkError> {
        SysClkError::check(unsafe { pdl::Cy_SysClk_ClkHfSetSource(clk_hf.raw(), path.raw()) })
    }

    fn clk_hf_set_divider(
        &mut self,
        clk_hf: ClkHf,
        divider: ClkHfDivider,
    ) -> Result<(), SysClkError> {
        SysClkError::check(unsafe {
            pdl::Cy_SysClk_ClkHfSetDivider(clk_hf.raw(), divider as u32)
        })
    }

    fn clk_hf_enable(&mut self, clk_hf: ClkHf) -> Result<(), SysClkError> {
        SysClkError::check(unsafe { pdl::Cy_SysClk_ClkHfEnable(clk_hf.raw()) })
    }

    fn peri_group_set_slave_ctl(
        &mut self,
        group: PeriGroup,
        reg: SlaveCtl,
        value: u32,
    ) -> Result<(), SysClkError> {
        SysClkError::check(unsafe {
            pdl::Cy_SysClk_PeriGroupSetSlaveCtl(group.raw(), reg as u32, value)
        })
    }

    fn peri_group_slave_init(&mut self, slave: MmioSlave) {
        unsafe {
            pdl::Cy_SysClk_PeriGroupSlaveInit(
                slave.group.peri() as u32,
                slave.group.group() as u32,
                slave.slave as u32,
                slave.clk_hf.raw(),
            )
        }
    }

    fn pll_is_enabled(&mut self, path: ClkPath) -> bool {
        unsafe { pdl::Cy_SysClk_PllIsEnabled(path.raw()) }
    }

    fn pll_disable(&mut self, path: ClkPath) -> Result<(), SysClkError> {
        SysClkError::check(unsafe { pdl::Cy_SysClk_PllDisable(path.raw()) })
    }

    fn pll_manual_configure(
        &mut self,
        path: ClkPath,
        config: &DpllHpConfig,
    ) -> Result<(), SysClkError> {
        let hp_config = config.to_raw();
        let manual_config = PllManualConfigRaw {
            lp_pll_cfg: core::ptr::null(),
            hp_pll_cfg: &hp_config,
        };
        // The PDL copies the record into the PLL registers and keeps no reference to it.
        SysClkError::check(unsafe { pdl::Cy_SysClk_PllManualConfigure(path.raw(), &manual_config) })
    }

    fn pll_enable(&mut self, path: ClkPath, timeout: Microseconds) -> Result<(), SysClkError> {
        SysClkError::check(unsafe { pdl::Cy_SysClk_PllEnable(path.raw(), timeout.ticks()) })
    }

    fn iho_enable(&mut self) {
        unsafe { pdl::Cy_SysClk_IhoEnable() }
    }

    fn pilo_enable(&mut self) {
        unsafe { pdl::Cy_SysClk_PiloEnable() }
    }

    fn system_core_clock_update(&mut self) {
        unsafe { pdl::SystemCoreClockUpdate() }
    }

    fn system_init(&mut self) {
        unsafe { pdl::SystemInit() }
    }
}

impl PowerPort for Pse84Port {
    fn enable_pd1(&mut self) {
        unsafe { pdl::Cy_System_EnablePD1() }
    }

    fn enable_socmem(&mut self, enable: bool) {
        unsafe { pdl::Cy_SysEnableSOCMEM(enable) }
    }

    fn clear_pd_dependency(&mut self, host: PdcmId, dest: PdcmId) {
        unsafe { pdl::cy_pd_pdcm_clear_dependency(host as u32, dest as u32) }
    }

    fn enable_cm55(&mut self, vector_table: u32, wait: Microseconds) {
        unsafe {
            pdl::Cy_SysEnableCM55(MXCM55_BASE as *mut c_void, vector_table, wait.ticks())
        }
    }

    fn set_deep_sleep_mode(&mut self, mode: DeepSleepMode) {
        let status = unsafe { pdl::Cy_SysPm_SetDeepSleepMode(mode as u32) };
        if status != 0 {
            log::warn!("setting system deep sleep mode {mode:?} failed: {status:#x}");
        }
    }

    fn set_socmem_deep_sleep_mode(&mut self, mode: DeepSleepMode) {
        let status = unsafe { pdl::Cy_SysPm_SetSOCMEMDeepSleepMode(mode as u32) };
        if status != 0 {
            log::warn!("setting SOCMEM deep sleep mode {mode:?} failed: {status:#x}");
        }
    }
}

impl ProtectionPort for Pse84Port {
    fn sau_init(&mut self) {
        unsafe { pdl::cy_sau_init() }
    }

    fn scb_setup(&mut self) {
        unsafe { pdl::SysCtrlBlk_Setup() }
    }

    fn nvic_ns_setup(&mut self) {
        unsafe { pdl::NVIC_NS_Setup() }
    }

    fn fpu_ns_init(&mut self) {
        unsafe { pdl::initFPU() }
    }

    fn mpc_init(&mut self) {
        unsafe { pdl::cy_mpc_Init() }
    }

    fn ppc_init(&mut self, ppc: Ppc) {
        match ppc {
            Ppc::Ppc0 => unsafe { pdl::cy_ppc0_Init() },
            Ppc::Ppc1 => unsafe { pdl::cy_ppc1_Init() },
        }
    }

    fn configure_mpu_region(&mut self, region: &MpuRegion) {
        cortex_m::asm::dmb();
        mpu::configure_region(&mut self.mpu, region);
        // Safety: Only the SCB is used, and nothing else owns it this early during boot.
        let cp = unsafe { cortex_m::Peripherals::steal() };
        unsafe { cp.SCB.shcsr.modify(mpu::shcsr_with_memfault) };
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    fn clear_mpu_execute_never(&mut self, region_count: u8) {
        mpu::clear_execute_never(&mut self.mpu, region_count);
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }
}

impl CachePort for Pse84Port {
    fn barrier(&mut self) {
        cortex_m::asm::dmb();
        cortex_m::asm::isb();
    }

    fn enable_icache(&mut self) {
        // Safety: Only the SCB is used, and nothing else owns it this early during boot.
        let mut cp = unsafe { cortex_m::Peripherals::steal() };
        cp.SCB.enable_icache();
    }

    fn enable_dcache(&mut self) {
        // Safety: See enable_icache.
        let mut cp = unsafe { cortex_m::Peripherals::steal() };
        cp.SCB.enable_dcache(&mut cp.CPUID);
    }
}

impl CorePort for Pse84Port {
    fn enable_irq(&mut self) {
        // Safety: Called from the boot sequence, no critical section is active.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn disable_irq(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn read_word(&mut self, addr: u32) -> u32 {
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    fn set_msp_ns(&mut self, stack_pointer: u32) {
        unsafe {
            core::arch::asm!(
                "msr MSP_NS, {sp}",
                sp = in(reg) stack_pointer,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    fn disable_systick(&mut self) {
        self.systick
            .modify_csr(|csr| csr.with_enable(false).with_tickint(false));
    }

    fn call_non_secure(&mut self, entry: u32) {
        // BLXNS only switches to the non-secure state if bit 0 of the target address is clear.
        let entry = entry & !1;
        unsafe {
            core::arch::asm!(
                "blxns {entry}",
                entry = in(reg) entry,
                clobber_abi("C"),
            );
        }
    }

    fn park(&mut self) {
        loop {
            cortex_m::asm::nop();
        }
    }

    fn ipc_pipe_config(&mut self, endpoints: &'static mut [IpcPipeEndpoint]) {
        unsafe { pdl::Cy_IPC_Pipe_Config(endpoints.as_mut_ptr()) }
    }

    fn connect_dynamic_irq(&mut self, irq: u32, priority: u32, isr: IsrAddress) {
        let Some(isr) = isr else {
            log::warn!("no ISR provided for IRQ {irq}");
            return;
        };
        // Safety: An ISR which ignores its argument is ABI compatible with the dynamic ISR
        // signature expected by the host operating system.
        let routine: unsafe extern "C" fn(*const c_void) = unsafe { core::mem::transmute(isr) };
        let result =
            unsafe { pdl::irq_connect_dynamic(irq, priority, routine, core::ptr::null(), 0) };
        if result < 0 {
            log::warn!("connecting IRQ {irq} failed: {result}");
        }
    }
}
