//! # Peripheral interconnect groups
//!
//! Every peripheral of the PSE84 sits in a group of one of the two peripheral interconnect
//! (PERI) instances. Each group has slave control registers which gate the clock of its members
//! and hold them in reset.
use crate::clocks::ClkHf;

/// A peripheral group of one PERI instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriGroup {
    peri: u8,
    group: u8,
}

impl PeriGroup {
    pub const fn new(peri: u8, group: u8) -> Self {
        Self { peri, group }
    }

    #[inline]
    pub const fn peri(&self) -> u8 {
        self.peri
    }

    #[inline]
    pub const fn group(&self) -> u8 {
        self.group
    }

    /// Encoding expected by the PDL, PERI instance in bits \[15:8\], group in bits \[7:0\].
    #[inline]
    pub const fn raw(&self) -> u32 {
        ((self.peri as u32) << 8) | self.group as u32
    }
}

pub const PERI0_GROUP1: PeriGroup = PeriGroup::new(0, 1);
pub const PERI0_GROUP2: PeriGroup = PeriGroup::new(0, 2);
pub const PERI0_GROUP3: PeriGroup = PeriGroup::new(0, 3);
/// Contains the NNLite neural network accelerator.
pub const PERI0_GROUP4: PeriGroup = PeriGroup::new(0, 4);
pub const PERI1_GROUP0: PeriGroup = PeriGroup::new(1, 0);
pub const PERI1_GROUP1: PeriGroup = PeriGroup::new(1, 1);
pub const PERI1_GROUP2: PeriGroup = PeriGroup::new(1, 2);

/// Slave control register of a peripheral group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SlaveCtl {
    /// Clock enable bits, one per group member.
    ClockEnable = 0,
    /// Reset bits, one per group member. A set bit holds the member in reset.
    Reset = 1,
    /// Idle control bits.
    Idle = 2,
}

/// Memory-mapped slave inside a peripheral group, together with its high-frequency clock root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioSlave {
    pub group: PeriGroup,
    pub slave: u8,
    pub clk_hf: ClkHf,
}

/// 512 kB tightly coupled memory of the CM55, as seen from the system bus.
pub const CM55_TCM_512K: MmioSlave = MmioSlave {
    group: PERI1_GROUP2,
    slave: 1,
    clk_hf: ClkHf::new(1),
};

/// Serial memory interface 0.
pub const SMIF0: MmioSlave = MmioSlave {
    group: PERI1_GROUP1,
    slave: 0,
    clk_hf: ClkHf::HF3,
};

/// Serial memory interface 0, second slave port.
pub const SMIF01: MmioSlave = MmioSlave {
    group: PERI1_GROUP1,
    slave: 1,
    clk_hf: ClkHf::HF4,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_encoding() {
        assert_eq!(PERI0_GROUP4.raw(), 0x004);
        assert_eq!(PERI1_GROUP2.raw(), 0x102);
    }
}
