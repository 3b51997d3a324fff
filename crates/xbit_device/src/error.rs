//! Error types for device lookup and block RAM access.

use crate::bram::BramKind;

/// Errors raised by the device catalog and the block RAM bit mappers.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The IDCODE does not match any part in the catalog.
    #[error("unknown/unsupported Xilinx device (IDCODE 0x{0:08X} not found)")]
    UnknownDevice(u32),

    /// No block RAM exists at the requested X/Y location.
    #[error("invalid block RAM location ({kind} X{x}Y{y})")]
    UnknownTile {
        /// Requested primitive category.
        kind: BramKind,
        /// Requested X coordinate.
        x: u32,
        /// Requested Y coordinate.
        y: u32,
    },

    /// A tile index is outside the device's tile table.
    #[error("block RAM index {0} is out of range")]
    BadTileIndex(usize),

    /// The requested primitive category does not exist on the device.
    #[error("block RAM category {0} is not available on this device")]
    UnsupportedCategory(BramKind),

    /// A data or parity bit address is outside the primitive's bit space.
    #[error("{space} bit address {addr} to be mapped is out of bounds")]
    AddressOutOfRange {
        /// Bit address that failed to map.
        addr: u64,
        /// Either `"data"` or `"parity"`.
        space: &'static str,
    },

    /// The byte vector passed to a bulk inject has the wrong size.
    #[error("size of data to be injected ({actual} bytes) does not match block RAM size ({expected} bytes)")]
    LengthMismatch {
        /// Required byte count for the target bit space.
        expected: usize,
        /// Byte count that was supplied.
        actual: usize,
    },

    /// A frame-data bit access fell outside the SLR's frame data slice.
    #[error("frame data bit offset {bit_offset} is out of bounds")]
    OutOfBounds {
        /// Offending bit offset (relative to the SLR frame data).
        bit_offset: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_device() {
        let err = DeviceError::UnknownDevice(0xDEADBEEF);
        assert_eq!(
            format!("{err}"),
            "unknown/unsupported Xilinx device (IDCODE 0xDEADBEEF not found)"
        );
    }

    #[test]
    fn display_unknown_tile() {
        let err = DeviceError::UnknownTile {
            kind: BramKind::Ramb36,
            x: 3,
            y: 17,
        };
        assert_eq!(format!("{err}"), "invalid block RAM location (RAMB36 X3Y17)");
    }

    #[test]
    fn display_length_mismatch() {
        let err = DeviceError::LengthMismatch {
            expected: 4096,
            actual: 17,
        };
        assert!(format!("{err}").contains("17 bytes"));
        assert!(format!("{err}").contains("4096 bytes"));
    }
}
