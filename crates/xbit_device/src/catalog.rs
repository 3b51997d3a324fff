//! The device catalog: per-part frame geometry and block RAM tables.

use crate::bram::{Bram, BramKind, BramTile, Ramb18Half};
use crate::error::DeviceError;
use crate::parts;

/// Device families distinguished by frame geometry and BRAM primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// 7-Series (101-word frames, RAMB36E1 primitives).
    Series7,
    /// UltraScale+ (93-word frames, RAMB36E2 primitives).
    UltrascalePlus,
}

/// Description of one supported FPGA part.
///
/// All rows live in the compile-time [`DEVICES`] table; the catalog is
/// process-wide immutable data and is never constructed at runtime.
#[derive(Debug)]
pub struct Device {
    /// Part name, e.g. `"xc7z020"`.
    pub name: &'static str,
    /// JTAG IDCODE of the part.
    pub idcode: u32,
    /// Device family.
    pub kind: DeviceKind,
    /// Number of 32-bit words per configuration frame.
    pub frame_words: usize,
    /// Number of Super Logic Regions in configuration order.
    pub slr_count: usize,
    /// Readback pipeline words in front of the padding frame.
    pub readback_front_words: usize,
    /// Readback padding words after the frame data.
    pub readback_back_words: usize,
    /// Extra sync words after the back padding of a raw readback stream.
    pub readback_back_sync_words: usize,
    /// Physical RAMB36 tiles of the device.
    pub ramb36: &'static [BramTile],
}

/// All parts known to the catalog.
pub const DEVICES: &[Device] = &[
    Device {
        name: "xc7z010",
        idcode: 0x0372_2093,
        kind: DeviceKind::Series7,
        frame_words: 101,
        slr_count: 1,
        readback_front_words: 0,
        readback_back_words: 0,
        readback_back_sync_words: 0,
        ramb36: parts::XC7Z010_RAMB36,
    },
    Device {
        name: "xc7z015",
        idcode: 0x0373_B093,
        kind: DeviceKind::Series7,
        frame_words: 101,
        slr_count: 1,
        readback_front_words: 0,
        readback_back_words: 0,
        readback_back_sync_words: 0,
        ramb36: parts::XC7Z015_RAMB36,
    },
    Device {
        name: "xc7z020",
        idcode: 0x0372_7093,
        kind: DeviceKind::Series7,
        frame_words: 101,
        slr_count: 1,
        readback_front_words: 0,
        readback_back_words: 0,
        readback_back_sync_words: 0,
        ramb36: parts::XC7Z020_RAMB36,
    },
    // The XCVU9P tile table was never tabulated for this catalog; the
    // geometry and readback constants are sufficient for packet-level and
    // readback handling of UltraScale+ bitstreams.
    Device {
        name: "xcvu9p",
        idcode: 0x14B3_1093,
        kind: DeviceKind::UltrascalePlus,
        frame_words: 93,
        slr_count: 3,
        readback_front_words: 20,
        readback_back_words: 0,
        readback_back_sync_words: 0,
        ramb36: &[],
    },
];

/// Gets a known device by its IDCODE.
pub fn lookup(idcode: u32) -> Result<&'static Device, DeviceError> {
    DEVICES
        .iter()
        .find(|d| d.idcode == idcode)
        .ok_or(DeviceError::UnknownDevice(idcode))
}

impl Device {
    /// Size of a single configuration frame in bytes.
    pub fn frame_size_bytes(&self) -> usize {
        self.frame_words * 4
    }

    /// Number of leading bytes (pipeline words plus one padding frame) in
    /// front of the actual frame data in an FDRO readback payload.
    pub fn readback_offset_bytes(&self) -> usize {
        self.readback_front_words * 4 + self.frame_size_bytes()
    }

    /// Number of block RAMs of the given category on this device.
    ///
    /// RAMB18 views exist only on 7-Series parts (two per physical RAMB36).
    pub fn num_brams(&self, kind: BramKind) -> usize {
        match (kind, self.kind) {
            (BramKind::Ramb36, _) => self.ramb36.len(),
            (BramKind::Ramb18, DeviceKind::Series7) => self.ramb36.len() * 2,
            (BramKind::Ramb18, DeviceKind::UltrascalePlus) => 0,
        }
    }

    /// Gets a block RAM by category and index.
    pub fn bram(&self, kind: BramKind, index: usize) -> Result<Bram<'_>, DeviceError> {
        match kind {
            BramKind::Ramb36 => {
                if index >= self.ramb36.len() {
                    return Err(DeviceError::BadTileIndex(index));
                }
                Ok(Bram::new(self, index, None))
            }
            BramKind::Ramb18 => {
                if self.kind != DeviceKind::Series7 {
                    return Err(DeviceError::UnsupportedCategory(kind));
                }
                if index >= self.ramb36.len() * 2 {
                    return Err(DeviceError::BadTileIndex(index));
                }
                let half = if index % 2 == 0 {
                    Ramb18Half::Bottom
                } else {
                    Ramb18Half::Top
                };
                Ok(Bram::new(self, index / 2, Some(half)))
            }
        }
    }

    /// Gets a block RAM by category and X/Y location (linear scan).
    pub fn bram_by_loc(&self, kind: BramKind, x: u32, y: u32) -> Result<Bram<'_>, DeviceError> {
        match kind {
            BramKind::Ramb36 => self
                .ramb36
                .iter()
                .position(|t| u32::from(t.x) == x && u32::from(t.y) == y)
                .map(|i| Bram::new(self, i, None))
                .ok_or(DeviceError::UnknownTile { kind, x, y }),
            BramKind::Ramb18 => {
                if self.kind != DeviceKind::Series7 {
                    return Err(DeviceError::UnsupportedCategory(kind));
                }
                let half = if y % 2 == 0 {
                    Ramb18Half::Bottom
                } else {
                    Ramb18Half::Top
                };
                self.ramb36
                    .iter()
                    .position(|t| u32::from(t.x) == x && u32::from(t.y) == y / 2)
                    .map(|i| Bram::new(self, i, Some(half)))
                    .ok_or(DeviceError::UnknownTile { kind, x, y })
            }
        }
    }
}
