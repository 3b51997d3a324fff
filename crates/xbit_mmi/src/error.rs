//! Error types for memory map loading and address translation.

use xbit_device::DeviceError;

/// Errors raised while reading an MMI file or translating addresses.
#[derive(Debug, thiserror::Error)]
pub enum MmiError {
    /// An I/O error occurred while reading the MMI file.
    #[error("failed to read memory map: {0}")]
    Io(#[from] std::io::Error),

    /// The XML document could not be parsed.
    #[error("failed to parse memory map XML: {0}")]
    Xml(String),

    /// The requested instance path does not exist in the document.
    #[error("memory instance '{0}' was not found in the MMI file")]
    UnknownInstance(String),

    /// A required element or attribute is missing or has a bad value.
    #[error("malformed memory map: {0}")]
    Malformed(String),

    /// A bit address falls outside every address space or bit lane.
    #[error("failed to map bit address 0x{bit_addr:X} to a block RAM")]
    UnmappedAddress {
        /// Offending absolute bit address.
        bit_addr: u64,
    },

    /// The matched bit lane declares parity bits; parity mapping is not
    /// implemented.
    #[error("parity bits in memory map lanes are not supported")]
    UnsupportedParity,

    /// A block RAM lookup or access failed.
    #[error(transparent)]
    Device(#[from] DeviceError),
}
