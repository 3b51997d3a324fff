//! Block RAM primitives and their bitstream bit mappers.
//!
//! RAMB36 tiles are physically organized as 1024 x (32+4) bits. The mapping
//! between a primitive's data/parity bit addresses and bit offsets inside the
//! configuration frame data was reverse engineered from logic-location files
//! produced by the vendor tools (a design with a single block RAM is
//! synthesized and the emitted `.ll` file is inverted). The resulting layout
//! is regular enough to be described by small lookup tables, a block-scale
//! constant and a few shifts. The tables below encode the silicon layout and
//! are not derivable from device geometry.

use serde::{Deserialize, Serialize};

use crate::catalog::{Device, DeviceKind};
use crate::error::DeviceError;
use crate::FrameAccess;

/// Block RAM primitive categories, as referenced by memory-map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BramKind {
    /// An 18Kb block RAM (one half of a physical RAMB36 tile).
    Ramb18,
    /// A 36Kb block RAM tile.
    Ramb36,
}

impl std::fmt::Display for BramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BramKind::Ramb18 => write!(f, "RAMB18"),
            BramKind::Ramb36 => write!(f, "RAMB36"),
        }
    }
}

/// Catalog row describing one physical RAMB36 tile of a device.
///
/// `bit_offset` is the absolute bit offset of the tile's first configuration
/// bit, relative to the start of its SLR's frame data area.
#[derive(Debug, Clone, Copy)]
pub struct BramTile {
    /// X location of the tile.
    pub x: u16,
    /// Y location of the tile.
    pub y: u16,
    /// Zero-based SLR index (configuration order) holding the tile.
    pub slr: u8,
    /// Bit offset of the tile's data inside the SLR frame data.
    pub bit_offset: u64,
}

impl BramTile {
    /// Shorthand constructor used by the per-part tile tables.
    pub const fn at(x: u16, y: u16, bit_offset: u64) -> Self {
        Self {
            x,
            y,
            slr: 0,
            bit_offset,
        }
    }
}

/// Which half of the parent RAMB36 a RAMB18 view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramb18Half {
    /// Lower half (Y = 2 * parent Y).
    Bottom,
    /// Upper half (Y = 2 * parent Y + 1).
    Top,
}

// -- RAMB36E1 (7-Series) ------------------------------------------------

/// Lower 4 result bits for both data and parity mappings.
const RAMB36E1_GROUP_L: [u64; 16] = [
    0x00, 0x08, 0x04, 0x0C, 0x01, 0x09, 0x05, 0x0D, 0x02, 0x0A, 0x06, 0x0E, 0x03, 0x0B, 0x07, 0x0F,
];

/// Upper result bits for the data mapping.
const RAMB36E1_GROUP_H: [u64; 16] = [
    0x00, 0x0B, 0x01, 0x0C, 0x02, 0x0D, 0x03, 0x0E, 0x05, 0x10, 0x06, 0x11, 0x07, 0x12, 0x08, 0x13,
];

/// Upper result bits for the parity mapping.
const RAMB36E1_GROUP_P: [u64; 2] = [0x04, 0x0F];

/// Block scale (stride of one 256-bit data block in frame bits).
const RAMB36E1_BLOCK_SCALE: u64 = 0xCA;

/// Maps a RAMB36E1 data bit address to a tile-relative frame bit offset.
fn ramb36e1_map_data_bit(addr: u64) -> Result<u64, DeviceError> {
    if addr >= 32768 {
        return Err(DeviceError::AddressOutOfRange {
            addr,
            space: "data",
        });
    }

    let base = (addr / 256) * RAMB36E1_BLOCK_SCALE + RAMB36E1_GROUP_H[(addr & 0x0F) as usize];
    Ok((base << 4) + RAMB36E1_GROUP_L[((addr >> 4) & 0x0F) as usize])
}

/// Maps a RAMB36E1 parity bit address to a tile-relative frame bit offset.
fn ramb36e1_map_parity_bit(addr: u64) -> Result<u64, DeviceError> {
    if addr >= 4096 {
        return Err(DeviceError::AddressOutOfRange {
            addr,
            space: "parity",
        });
    }

    let base = (addr / 32) * RAMB36E1_BLOCK_SCALE + RAMB36E1_GROUP_P[(addr & 0x01) as usize];
    Ok((base << 4) + RAMB36E1_GROUP_L[((addr >> 1) & 0x0F) as usize])
}

// -- RAMB36E2 (UltraScale+) ---------------------------------------------

/// Tile-relative offsets of the 128 data bits within one block.
const RAMB36E2_DATA_TABLE: [u16; 128] = [
    0x00, 0x84, 0x0C, 0x90, 0x18, 0x9C, 0x24, 0xA8, 0x3C, 0xC0, 0x48, 0xCC, 0x54, 0xD8, 0x60,
    0xE4, 0x06, 0x8A, 0x12, 0x96, 0x1E, 0xA2, 0x2A, 0xAE, 0x42, 0xC6, 0x4E, 0xD2, 0x5A, 0xDE,
    0x66, 0xEA, 0x03, 0x87, 0x0F, 0x93, 0x1B, 0x9F, 0x27, 0xAB, 0x3F, 0xC3, 0x4B, 0xCF, 0x57,
    0xDB, 0x63, 0xE7, 0x09, 0x8D, 0x15, 0x99, 0x21, 0xA5, 0x2D, 0xB1, 0x45, 0xC9, 0x51, 0xD5,
    0x5D, 0xE1, 0x69, 0xED, 0x02, 0x86, 0x0E, 0x92, 0x1A, 0x9E, 0x26, 0xAA, 0x3E, 0xC2, 0x4A,
    0xCE, 0x56, 0xDA, 0x62, 0xE6, 0x08, 0x8C, 0x14, 0x98, 0x20, 0xA4, 0x2C, 0xB0, 0x44, 0xC8,
    0x50, 0xD4, 0x5C, 0xE0, 0x68, 0xEC, 0x05, 0x89, 0x11, 0x95, 0x1D, 0xA1, 0x29, 0xAD, 0x41,
    0xC5, 0x4D, 0xD1, 0x59, 0xDD, 0x65, 0xE9, 0x0B, 0x8F, 0x17, 0x9B, 0x23, 0xA7, 0x2F, 0xB3,
    0x47, 0xCB, 0x53, 0xD7, 0x5F, 0xE3, 0x6B, 0xEF,
];

/// Tile-relative offsets of the 16 parity bits within one block.
const RAMB36E2_PARITY_TABLE: [u16; 16] = [
    0x30, 0xB4, 0x36, 0xBA, 0x33, 0xB7, 0x39, 0xBD, 0x32, 0xB6, 0x38, 0xBC, 0x35, 0xB9, 0x3B,
    0xBF,
];

/// Block scale (stride of one 128-bit data block in frame bits).
const RAMB36E2_BLOCK_SCALE: u64 = 0xBA0;

/// Maps a RAMB36E2 data bit address to a tile-relative frame bit offset.
fn ramb36e2_map_data_bit(addr: u64) -> Result<u64, DeviceError> {
    if addr >= 32768 {
        return Err(DeviceError::AddressOutOfRange {
            addr,
            space: "data",
        });
    }

    Ok((addr >> 7) * RAMB36E2_BLOCK_SCALE + u64::from(RAMB36E2_DATA_TABLE[(addr & 0x7F) as usize]))
}

/// Maps a RAMB36E2 parity bit address to a tile-relative frame bit offset.
fn ramb36e2_map_parity_bit(addr: u64) -> Result<u64, DeviceError> {
    if addr >= 4096 {
        return Err(DeviceError::AddressOutOfRange {
            addr,
            space: "parity",
        });
    }

    Ok((addr >> 4) * RAMB36E2_BLOCK_SCALE
        + u64::from(RAMB36E2_PARITY_TABLE[(addr & 0x0F) as usize]))
}

// -- Resolved primitive handles ------------------------------------------

/// A block RAM primitive resolved against a device.
///
/// A `Bram` either denotes a physical RAMB36 tile, or a RAMB18 view onto the
/// top or bottom half of one. The view is encoded as the parent's index into
/// the device tile table plus a half selector, so no self-referential
/// borrows are needed.
#[derive(Debug, Clone, Copy)]
pub struct Bram<'d> {
    device: &'d Device,
    index: usize,
    half: Option<Ramb18Half>,
}

impl<'d> Bram<'d> {
    pub(crate) fn new(device: &'d Device, index: usize, half: Option<Ramb18Half>) -> Self {
        Self {
            device,
            index,
            half,
        }
    }

    fn tile(&self) -> &'d BramTile {
        &self.device.ramb36[self.index]
    }

    /// Gets the name of the underlying primitive.
    pub fn primitive_name(&self) -> &'static str {
        match (self.device.kind, self.half) {
            (DeviceKind::Series7, None) => "RAMB36E1",
            (DeviceKind::Series7, Some(_)) => "RAMB18E1",
            (DeviceKind::UltrascalePlus, _) => "RAMB36E2",
        }
    }

    /// Gets the primitive category of this handle.
    pub fn kind(&self) -> BramKind {
        if self.half.is_some() {
            BramKind::Ramb18
        } else {
            BramKind::Ramb36
        }
    }

    /// X location of the tile.
    pub fn x(&self) -> u32 {
        u32::from(self.tile().x)
    }

    /// Y location of the tile. RAMB18 views live at `2 * parent_y` (bottom)
    /// or `2 * parent_y + 1` (top).
    pub fn y(&self) -> u32 {
        let y = u32::from(self.tile().y);
        match self.half {
            None => y,
            Some(Ramb18Half::Bottom) => 2 * y,
            Some(Ramb18Half::Top) => 2 * y + 1,
        }
    }

    /// Zero-based SLR index of the tile.
    pub fn slr(&self) -> usize {
        usize::from(self.tile().slr)
    }

    /// Number of RAM words.
    pub fn num_words(&self) -> u64 {
        1024
    }

    /// Data bits per RAM word.
    pub fn data_bits(&self) -> u64 {
        if self.half.is_some() {
            16
        } else {
            32
        }
    }

    /// Parity bits per RAM word.
    pub fn parity_bits(&self) -> u64 {
        if self.half.is_some() {
            2
        } else {
            4
        }
    }

    /// Bit offset of the tile's first configuration bit inside the SLR
    /// frame data.
    pub fn bitstream_offset(&self) -> u64 {
        self.tile().bit_offset
    }

    /// Maps a RAM data (or parity) bit address to its absolute bit offset
    /// inside the SLR's frame data.
    ///
    /// RAMB18 views delegate to the parent tile with the half offset applied
    /// (+16384 data / +2048 parity for the top half).
    pub fn map_to_bitstream(&self, bit_addr: u64, is_parity: bool) -> Result<u64, DeviceError> {
        let addr = match self.half {
            Some(Ramb18Half::Top) => bit_addr + if is_parity { 2048 } else { 16384 },
            _ => bit_addr,
        };

        let relative = match (self.device.kind, is_parity) {
            (DeviceKind::Series7, false) => ramb36e1_map_data_bit(addr)?,
            (DeviceKind::Series7, true) => ramb36e1_map_parity_bit(addr)?,
            (DeviceKind::UltrascalePlus, false) => ramb36e2_map_data_bit(addr)?,
            (DeviceKind::UltrascalePlus, true) => ramb36e2_map_parity_bit(addr)?,
        };

        Ok(self.tile().bit_offset + relative)
    }

    /// Reads a single RAM bit out of the frame data.
    pub fn extract_bit(
        &self,
        access: &impl FrameAccess,
        bit_addr: u64,
        is_parity: bool,
    ) -> Result<bool, DeviceError> {
        let src = self.map_to_bitstream(bit_addr, is_parity)?;
        access.read_frame_bit(self.slr(), src)
    }

    /// Writes a single RAM bit into the frame data.
    pub fn inject_bit(
        &self,
        access: &mut impl FrameAccess,
        bit_addr: u64,
        is_parity: bool,
        value: bool,
    ) -> Result<(), DeviceError> {
        let dst = self.map_to_bitstream(bit_addr, is_parity)?;
        access.write_frame_bit(self.slr(), dst, value)
    }

    /// Extracts the data (or parity) contents of this block RAM.
    ///
    /// Bits are packed LSB-first into the returned byte vector.
    pub fn extract(
        &self,
        access: &impl FrameAccess,
        extract_parity: bool,
    ) -> Result<Vec<u8>, DeviceError> {
        let bit_length = self.bit_length(extract_parity);
        let byte_length = (bit_length + 7) / 8;

        let mut extracted = vec![0u8; byte_length as usize];

        for i in 0..bit_length {
            if self.extract_bit(access, i, extract_parity)? {
                extracted[(i / 8) as usize] |= 1 << (i % 8);
            }
        }

        Ok(extracted)
    }

    /// Injects data (or parity) contents into this block RAM.
    ///
    /// `data` must have exactly the byte length of the target bit space.
    pub fn inject(
        &self,
        access: &mut impl FrameAccess,
        inject_parity: bool,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        let bit_length = self.bit_length(inject_parity);
        let byte_length = ((bit_length + 7) / 8) as usize;

        if data.len() != byte_length {
            return Err(DeviceError::LengthMismatch {
                expected: byte_length,
                actual: data.len(),
            });
        }

        for i in 0..bit_length {
            let value = (data[(i / 8) as usize] >> (i % 8)) & 1 != 0;
            self.inject_bit(access, i, inject_parity, value)?;
        }

        Ok(())
    }

    fn bit_length(&self, parity: bool) -> u64 {
        let per_word = if parity {
            self.parity_bits()
        } else {
            self.data_bits()
        };
        per_word * self.num_words()
    }
}

impl std::fmt::Display for Bram<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_X{}Y{}", self.primitive_name(), self.x(), self.y())
    }
}
