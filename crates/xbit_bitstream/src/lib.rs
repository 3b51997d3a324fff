//! Parsing, interpretation and rewriting of Xilinx FPGA bitstreams.
//!
//! This crate is the core of the xbit toolkit. It turns the raw byte
//! stream of a Series-7 or UltraScale+ configuration bitstream into a
//! normalized stream of typed packets ([`packet`]), emulates the
//! configuration controller's register state across SLR boundaries
//! ([`engine`]), and provides the [`Bitstream`] container with in-place
//! editing, CRC stripping, readback conversion and bit-accurate frame
//! data access honoring the 32-bit word swap.
//!
//! The bitstream format is documented informally in [Xilinx UG470/UG570;
//! "Bitstream Composition"]; the SLR chaining via register 0x1E and the
//! block RAM frame layout are reverse engineered from real bitstreams.

#![warn(missing_docs)]

pub mod bitstream;
pub mod buffer;
pub mod context;
pub mod engine;
pub mod error;
pub mod packet;
pub mod regs;

pub use bitstream::{Bitstream, SlrInfo};
pub use buffer::WordView;
pub use context::{ConfigContext, WriteMode};
pub use engine::{ConfigEngine, ConfigVisitor};
pub use error::BitstreamError;
pub use packet::{
    Op, Packet, PacketKind, PacketParser, CRC_WRITE_HEADER, NOP_WORD, SYNC_PATTERN, SYNC_WORD,
};
pub use regs::{ConfigCmd, ConfigReg};
