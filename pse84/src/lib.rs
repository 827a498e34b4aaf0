//! # Low-level access for the PSOC Edge E84 (PSE84) family
//!
//! This crate contains the architectural register blocks of the Cortex-M33 and Cortex-M55 cores
//! which are programmed directly during boot ([mpu], [systick]), the fixed memory map of the SoC
//! ([memmap]) and the C ABI surface of the vendor peripheral driver library ([pdl]).
//!
//! Everything that goes through the vendor driver library is treated as an opaque, trusted
//! collaborator. The typed layer on top of this crate lives in the `pse84-hal` crate.
#![no_std]

pub mod memmap;
pub mod mpu;
pub mod pdl;
pub mod systick;
