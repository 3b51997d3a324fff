//! Device catalog and block RAM bit mapping for Xilinx FPGAs.
//!
//! This crate describes the supported parts (frame geometry, SLR count,
//! readback pipeline constants, block RAM tile tables) and implements the
//! reverse-engineered mapping between block RAM data/parity bit addresses
//! and bit offsets inside the configuration frame data. Frame data itself is
//! reached through the [`FrameAccess`] trait, implemented by the bitstream
//! container; this keeps the catalog free of any dependency on a concrete
//! bitstream representation.

#![warn(missing_docs)]

pub mod bram;
pub mod catalog;
pub mod error;
mod parts;

pub use bram::{Bram, BramKind, BramTile, Ramb18Half};
pub use catalog::{lookup, Device, DeviceKind, DEVICES};
pub use error::DeviceError;

/// Bit-level access to the configuration frame data of one SLR.
///
/// Offsets are plain bit offsets relative to the start of the SLR's frame
/// data area; implementations are expected to handle any storage-level
/// transformation (such as the 32-bit word swap of bitstream files)
/// internally.
pub trait FrameAccess {
    /// Reads the bit at `bit_offset` in the given SLR's frame data.
    fn read_frame_bit(&self, slr: usize, bit_offset: u64) -> Result<bool, DeviceError>;

    /// Writes the bit at `bit_offset` in the given SLR's frame data.
    fn write_frame_bit(&mut self, slr: usize, bit_offset: u64, value: bool)
        -> Result<(), DeviceError>;
}
