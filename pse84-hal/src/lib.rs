//! # HAL for the Infineon PSOC Edge E84 SoC family
//!
//! This crate contains the **H**ardware **A**bstraction **L**ayer (HAL) used to bring up the
//! PSE84 SoC. It sits on top of the [register and vendor driver definitions](pse84) and
//! provides typed identifiers for clocks, power domains and peripheral groups, the fixed clock
//! driver and the interrupt vector redirection shim.
//!
//! All side effects go through the capability traits of the [port] module. This allows running
//! the boot logic against [port::recorder::CallRecorder] on the host.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clocks;
pub mod fatal;
pub mod fixed_clock;
pub mod log;
pub mod mpu;
pub mod peri;
pub mod port;
pub mod power;
pub mod sysint;
pub mod time;

pub use pse84 as pac;
