//! Error types for bitstream parsing and rewriting.

use xbit_device::DeviceError;

/// Errors raised while parsing, interpreting or rewriting a bitstream.
#[derive(Debug, thiserror::Error)]
pub enum BitstreamError {
    /// An I/O error occurred while reading or writing bitstream data.
    #[error("i/o error while accessing bitstream data: {0}")]
    Io(#[from] std::io::Error),

    /// The SYNC pattern was not found where the loader requires one.
    #[error("sync word (AA995566) was not found in the bitstream")]
    SyncNotFound,

    /// A packet header could not be decoded (unknown type bits, or a
    /// freestanding TYPE2 packet without a preceding TYPE1 packet).
    #[error("unhandled configuration packet at byte offset {offset}: 0x{header:08X}")]
    UnhandledPacket {
        /// Absolute byte offset of the offending header word.
        offset: usize,
        /// The raw header word.
        header: u32,
    },

    /// A packet's declared word count exceeds the remaining stream length.
    #[error("malformed bitstream: packet payload of {word_count} words at byte offset {offset} exceeds end of bitstream")]
    PayloadOverflow {
        /// Absolute byte offset of the packet header.
        offset: usize,
        /// Declared payload word count.
        word_count: usize,
    },

    /// A CRC write packet (header 0x30000001) does not span exactly 8 bytes.
    #[error("invalid CRC command packet (size != 8 bytes)")]
    MalformedCrcPacket,

    /// The IDCODE found in the bitstream differs from the expected value.
    #[error("mismatch between actual and expected IDCODE values (expected 0x{expected:08X}, found 0x{found:08X})")]
    IdcodeMismatch {
        /// Expected IDCODE.
        expected: u32,
        /// IDCODE extracted from the bitstream.
        found: u32,
    },

    /// The bitstream uses features outside the supported subset
    /// (compressed multi-FDRI streams, mixed FDRI/FDRO, missing frame
    /// data, unsolicited readback, or write-mode violations).
    #[error("unsupported bitstream features: {0}")]
    Unsupported(String),

    /// A frame data access fell outside the SLR's frame data slice.
    #[error("frame data slice is out of bounds (byte offset {offset}, slice size {size})")]
    OutOfBounds {
        /// Offending byte offset relative to the frame data slice.
        offset: usize,
        /// Size of the frame data slice in bytes.
        size: usize,
    },

    /// An SLR index does not exist in the loaded bitstream.
    #[error("SLR index {0} is out of range")]
    BadSlrIndex(usize),

    /// A device catalog lookup failed during semantic interpretation.
    #[error(transparent)]
    Device(#[from] DeviceError),
}
