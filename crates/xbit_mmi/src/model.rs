//! Memory map data model and processor address translation.

use serde::{Deserialize, Serialize};

use xbit_device::{BramKind, Device, FrameAccess};

use crate::error::MmiError;

/// Byte endianness of a processor, as declared in the MMI file.
///
/// Carried for completeness; bit-level access is driven purely by the
/// MSB/LSB slices of the bit lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    /// Little-endian processor.
    Little,
    /// Big-endian processor.
    Big,
}

/// One bit lane of a bus block: a slice of the address space's data word
/// served by a single block RAM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitLane {
    /// Block RAM primitive category serving this lane.
    pub kind: BramKind,
    /// X location of the block RAM.
    pub x: u32,
    /// Y location of the block RAM.
    pub y: u32,
    /// Most significant bit position in the space's data word.
    pub msb: u32,
    /// Least significant bit position in the space's data word.
    pub lsb: u32,
    /// Set when the MMI file declared the lane with LSB > MSB
    /// (bit-reversed lane); `msb`/`lsb` are stored normalized.
    pub bit_reversed: bool,
    /// First word address (relative to the space) covered by the lane.
    pub start_word: u32,
    /// Last word address (relative to the space) covered by the lane.
    pub end_word: u32,
    /// Number of parity bits declared for the lane.
    pub parity_bits: u32,
}

/// A contiguous address space of a memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpace {
    /// Name of the address space.
    pub name: String,
    /// First byte address of the space.
    pub start_byte: u64,
    /// Last byte address of the space (inclusive).
    pub end_byte: u64,
    /// Width of one data word in bits (inferred from the lane slices).
    pub word_size: u32,
    /// Total number of data words in the space.
    pub total_words: u64,
    /// Bit lanes of the space's bus block.
    pub lanes: Vec<BitLane>,
}

/// Result of translating an absolute bit address to a block RAM bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedBit {
    /// Primitive category of the target block RAM.
    pub kind: BramKind,
    /// X location of the target block RAM.
    pub x: u32,
    /// Y location of the target block RAM.
    pub y: u32,
    /// Bit address local to the RAM's data (or parity) space.
    pub local_bit: u64,
    /// Whether the bit lives in the parity space.
    pub is_parity: bool,
}

/// The memory map of one processor or memory array instance.
///
/// Immutable after parsing; translation and access never mutate the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMap {
    /// Instance path the map was extracted for.
    pub instance: String,
    /// Declared processor endianness (absent for memory arrays).
    pub endianness: Option<Endianness>,
    /// Address spaces, sorted by increasing start address.
    pub spaces: Vec<AddressSpace>,
}

impl MemoryMap {
    /// Finds the address space containing the given bit address.
    fn space_for(&self, bit_addr: u64) -> Result<&AddressSpace, MmiError> {
        let byte_addr = bit_addr / 8;
        self.spaces
            .iter()
            .find(|s| s.start_byte <= byte_addr && byte_addr <= s.end_byte)
            .ok_or(MmiError::UnmappedAddress { bit_addr })
    }

    /// Translates an absolute bit address into a block RAM bit location.
    ///
    /// Lanes declaring parity bits are rejected: the mapping formula for
    /// the parity space is an open question, and guessing would corrupt
    /// output data.
    pub fn map_bit_address(&self, bit_addr: u64) -> Result<MappedBit, MmiError> {
        let space = self.space_for(bit_addr)?;

        let word_bit_offset = bit_addr - space.start_byte * 8;
        let word_index = word_bit_offset / u64::from(space.word_size);
        let bit_in_word = (word_bit_offset % u64::from(space.word_size)) as u32;

        let lane = space
            .lanes
            .iter()
            .find(|l| l.lsb <= bit_in_word && bit_in_word <= l.msb)
            .ok_or(MmiError::UnmappedAddress { bit_addr })?;

        if lane.parity_bits > 0 {
            return Err(MmiError::UnsupportedParity);
        }

        let lane_word_size = u64::from(lane.msb - lane.lsb + 1);
        let local_bit = word_index * lane_word_size + u64::from(bit_in_word - lane.lsb);

        Ok(MappedBit {
            kind: lane.kind,
            x: lane.x,
            y: lane.y,
            local_bit,
            is_parity: false,
        })
    }

    /// Reads a single bit at a processor bit address.
    pub fn read_bit(
        &self,
        device: &Device,
        access: &impl FrameAccess,
        bit_addr: u64,
    ) -> Result<bool, MmiError> {
        let mapped = self.map_bit_address(bit_addr)?;
        let ram = device.bram_by_loc(mapped.kind, mapped.x, mapped.y)?;
        Ok(ram.extract_bit(access, mapped.local_bit, mapped.is_parity)?)
    }

    /// Writes a single bit at a processor bit address.
    pub fn write_bit(
        &self,
        device: &Device,
        access: &mut impl FrameAccess,
        bit_addr: u64,
        value: bool,
    ) -> Result<(), MmiError> {
        let mapped = self.map_bit_address(bit_addr)?;
        let ram = device.bram_by_loc(mapped.kind, mapped.x, mapped.y)?;
        Ok(ram.inject_bit(access, mapped.local_bit, mapped.is_parity, value)?)
    }

    /// Reads one byte at a processor byte address, LSB first.
    pub fn read_byte(
        &self,
        device: &Device,
        access: &impl FrameAccess,
        byte_addr: u64,
    ) -> Result<u8, MmiError> {
        let mut value = 0u8;
        for i in 0..8 {
            if self.read_bit(device, access, byte_addr * 8 + i)? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Writes one byte at a processor byte address, LSB first.
    pub fn write_byte(
        &self,
        device: &Device,
        access: &mut impl FrameAccess,
        byte_addr: u64,
        value: u8,
    ) -> Result<(), MmiError> {
        for i in 0..8 {
            self.write_bit(device, access, byte_addr * 8 + i, (value >> i) & 1 != 0)?;
        }
        Ok(())
    }

    /// Total byte size covered by all address spaces.
    pub fn total_bytes(&self) -> u64 {
        self.spaces
            .iter()
            .map(|s| s.end_byte - s.start_byte + 1)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lane_map() -> MemoryMap {
        MemoryMap {
            instance: "cpu0".into(),
            endianness: Some(Endianness::Little),
            spaces: vec![AddressSpace {
                name: "bram".into(),
                start_byte: 0x1000,
                end_byte: 0x1FFF,
                word_size: 32,
                total_words: 1024,
                lanes: vec![
                    BitLane {
                        kind: BramKind::Ramb36,
                        x: 0,
                        y: 0,
                        msb: 15,
                        lsb: 0,
                        bit_reversed: false,
                        start_word: 0,
                        end_word: 1023,
                        parity_bits: 0,
                    },
                    BitLane {
                        kind: BramKind::Ramb36,
                        x: 1,
                        y: 0,
                        msb: 31,
                        lsb: 16,
                        bit_reversed: false,
                        start_word: 0,
                        end_word: 1023,
                        parity_bits: 0,
                    },
                ],
            }],
        }
    }

    #[test]
    fn maps_low_lane() {
        let map = two_lane_map();
        let mapped = map.map_bit_address(0x1000 * 8).unwrap();
        assert_eq!((mapped.x, mapped.y), (0, 0));
        assert_eq!(mapped.local_bit, 0);
        assert!(!mapped.is_parity);
    }

    #[test]
    fn maps_high_lane() {
        let map = two_lane_map();
        // Bit 16 of word 0 is bit 0 of the high lane.
        let mapped = map.map_bit_address(0x1000 * 8 + 16).unwrap();
        assert_eq!((mapped.x, mapped.y), (1, 0));
        assert_eq!(mapped.local_bit, 0);
    }

    #[test]
    fn maps_second_word() {
        let map = two_lane_map();
        // Word 1, bit 3 -> low lane, local bit 1*16 + 3.
        let mapped = map.map_bit_address(0x1000 * 8 + 32 + 3).unwrap();
        assert_eq!((mapped.x, mapped.y), (0, 0));
        assert_eq!(mapped.local_bit, 19);
    }

    #[test]
    fn address_outside_spaces_is_unmapped() {
        let map = two_lane_map();
        let err = map.map_bit_address(0).unwrap_err();
        assert!(matches!(err, MmiError::UnmappedAddress { .. }));
        let err = map.map_bit_address(0x2000 * 8).unwrap_err();
        assert!(matches!(err, MmiError::UnmappedAddress { .. }));
    }

    #[test]
    fn parity_lane_is_rejected() {
        let mut map = two_lane_map();
        map.spaces[0].lanes[0].parity_bits = 2;
        let err = map.map_bit_address(0x1000 * 8).unwrap_err();
        assert!(matches!(err, MmiError::UnsupportedParity));
    }

    #[test]
    fn hole_between_lanes_is_unmapped() {
        let mut map = two_lane_map();
        map.spaces[0].lanes.remove(1);
        let err = map.map_bit_address(0x1000 * 8 + 20).unwrap_err();
        assert!(matches!(err, MmiError::UnmappedAddress { .. }));
    }

    #[test]
    fn total_bytes_sums_spaces() {
        assert_eq!(two_lane_map().total_bytes(), 0x1000);
    }

    #[test]
    fn serde_round_trip() {
        let map = two_lane_map();
        let json = serde_json::to_string(&map).unwrap();
        let back: MemoryMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    /// End-to-end: byte writes through the memory map land in the frame
    /// data of a real bitstream and read back identically, both through
    /// the map and through the raw block RAM extractor.
    #[test]
    fn byte_round_trip_through_bitstream() {
        use xbit_bitstream::Bitstream;

        // Single-SLR xc7z010 bitstream with enough frame data to cover
        // block RAM X0Y0 (tile bit offset 0xEB0AC0 plus its mapped span).
        let payload_words: usize = 500_000;
        let mut words: Vec<u32> = vec![
            0xAA99_5566,
            (0b001 << 29) | (0b10 << 27) | (0x0C << 13) | 1, // write IDCODE
            0x0372_2093,
            (0b001 << 29) | (0b10 << 27) | (0x02 << 13),     // write FDRI, TYPE2 count
            (0b010 << 29) | (0b10 << 27) | payload_words as u32,
        ];
        words.extend(std::iter::repeat(0u32).take(payload_words));
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();

        let mut bs = Bitstream::parse_config(bytes, None, false).unwrap();
        let device = xbit_device::lookup(0x0372_2093).unwrap();

        let map = MemoryMap {
            instance: "cpu0".into(),
            endianness: Some(Endianness::Little),
            spaces: vec![AddressSpace {
                name: "bram".into(),
                start_byte: 0,
                end_byte: 4095,
                word_size: 8,
                total_words: 4096,
                lanes: vec![BitLane {
                    kind: BramKind::Ramb36,
                    x: 0,
                    y: 0,
                    msb: 7,
                    lsb: 0,
                    bit_reversed: false,
                    start_word: 0,
                    end_word: 4095,
                    parity_bits: 0,
                }],
            }],
        };

        for (addr, value) in [(0u64, 0xA5u8), (1, 0x17), (100, 0xFF), (4095, 0x3C)] {
            map.write_byte(device, &mut bs, addr, value).unwrap();
            assert_eq!(map.read_byte(device, &bs, addr).unwrap(), value);
        }

        // The same bytes are visible through the raw extractor.
        let ram = device.bram_by_loc(BramKind::Ramb36, 0, 0).unwrap();
        let data = ram.extract(&bs, false).unwrap();
        assert_eq!(data[0], 0xA5);
        assert_eq!(data[1], 0x17);
        assert_eq!(data[100], 0xFF);
        assert_eq!(data[4095], 0x3C);
    }
}
