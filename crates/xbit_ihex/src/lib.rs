//! Intel-HEX image reading.
//!
//! Records have the text form `:LLAAAATT<data...>CC`. [`parse`] walks the
//! records of a file one by one; [`load`] additionally runs the segment
//! state machine (extended segment/linear base addresses, entrypoints)
//! and hands data chunks with absolute addresses to a loader callback.

#![warn(missing_docs)]

use std::io::BufRead;
use std::path::Path;

/// Errors raised while reading an Intel-HEX file.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    /// An I/O error occurred while reading the input.
    #[error("i/o error while reading intel hex data: {0}")]
    Io(#[from] std::io::Error),

    /// A record is syntactically malformed.
    #[error("malformed intel hex record at line {line}: {reason}")]
    Malformed {
        /// One-based line number of the offending record.
        line: usize,
        /// What was wrong with the record.
        reason: &'static str,
    },

    /// A record's checksum byte does not balance the record contents.
    #[error("checksum error in intel hex record at line {line}")]
    Checksum {
        /// One-based line number of the offending record.
        line: usize,
    },

    /// A record type is not supported, or its payload has the wrong size
    /// for its type.
    #[error("unsupported record type 0x{record_type:02X} in intel hex file (line {line})")]
    UnsupportedRecord {
        /// Record type field.
        record_type: u8,
        /// One-based line number of the offending record.
        line: usize,
    },
}

/// Record types defined by the Intel-HEX format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// Data record.
    Data,
    /// End-of-file record.
    EndOfFile,
    /// Extended segment address record (base = segment * 16).
    ExtendedSegment,
    /// Start segment address record (CS:IP entrypoint).
    StartSegment,
    /// Extended linear address record (upper 16 address bits).
    ExtendedLinear,
    /// Start linear address record (32-bit entrypoint).
    StartLinear,
}

impl RecordType {
    /// Decodes the record type field.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(RecordType::Data),
            0x01 => Some(RecordType::EndOfFile),
            0x02 => Some(RecordType::ExtendedSegment),
            0x03 => Some(RecordType::StartSegment),
            0x04 => Some(RecordType::ExtendedLinear),
            0x05 => Some(RecordType::StartLinear),
            _ => None,
        }
    }
}

/// One record of an Intel-HEX file.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// One-based line number the record was read from.
    pub line: usize,
    /// 16-bit address field.
    pub address: u16,
    /// Raw record type field.
    pub record_type: u8,
    /// Payload bytes.
    pub data: Vec<u8>,
    /// Checksum field (verified during parsing).
    pub checksum: u8,
}

fn hex_nibble(c: u8, line: usize) -> Result<u32, HexError> {
    match c {
        b'0'..=b'9' => Ok(u32::from(c - b'0')),
        b'A'..=b'F' => Ok(u32::from(c - b'A' + 10)),
        b'a'..=b'f' => Ok(u32::from(c - b'a' + 10)),
        _ => Err(HexError::Malformed {
            line,
            reason: "invalid hex digit",
        }),
    }
}

fn hex_u8(bytes: &[u8], pos: usize, line: usize) -> Result<u32, HexError> {
    if pos + 2 > bytes.len() {
        return Err(HexError::Malformed {
            line,
            reason: "unexpected end of line",
        });
    }
    Ok((hex_nibble(bytes[pos], line)? << 4) | hex_nibble(bytes[pos + 1], line)?)
}

/// Parses a single record line. Returns `None` for blank lines.
fn parse_record(line_text: &str, line: usize) -> Result<Option<Record>, HexError> {
    let trimmed = line_text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let bytes = trimmed.as_bytes();
    if bytes[0] != b':' {
        return Err(HexError::Malformed {
            line,
            reason: "record does not start with ':'",
        });
    }

    let payload_len = hex_u8(bytes, 1, line)? as usize;
    let addr_hi = hex_u8(bytes, 3, line)?;
    let addr_lo = hex_u8(bytes, 5, line)?;
    let record_type = hex_u8(bytes, 7, line)? as u8;

    let mut record = Record {
        line,
        address: ((addr_hi << 8) | addr_lo) as u16,
        record_type,
        data: Vec::with_capacity(payload_len),
        checksum: 0,
    };

    let mut pos = 9;
    for _ in 0..payload_len {
        record.data.push(hex_u8(bytes, pos, line)? as u8);
        pos += 2;
    }

    record.checksum = hex_u8(bytes, pos, line)? as u8;
    pos += 2;

    if pos != bytes.len() {
        return Err(HexError::Malformed {
            line,
            reason: "unexpected extra data at end of record",
        });
    }

    // The 8-bit sum of all record bytes, checksum included, must be zero.
    let mut sum = payload_len as u8;
    sum = sum
        .wrapping_add((record.address >> 8) as u8)
        .wrapping_add(record.address as u8)
        .wrapping_add(record.record_type);
    for &b in &record.data {
        sum = sum.wrapping_add(b);
    }
    sum = sum.wrapping_add(record.checksum);

    if sum != 0 {
        return Err(HexError::Checksum { line });
    }

    Ok(Some(record))
}

/// Parses all records from a reader, invoking `callback` for each one.
///
/// The callback returns `false` to stop reading early (not an error).
pub fn parse(
    reader: impl BufRead,
    mut callback: impl FnMut(&Record) -> Result<bool, HexError>,
) -> Result<(), HexError> {
    for (index, line_result) in reader.lines().enumerate() {
        let line_text = line_result?;
        if let Some(record) = parse_record(&line_text, index + 1)? {
            if !callback(&record)? {
                break;
            }
        }
    }
    Ok(())
}

/// Parses all records of an Intel-HEX file.
pub fn parse_file(
    path: impl AsRef<Path>,
    callback: impl FnMut(&Record) -> Result<bool, HexError>,
) -> Result<(), HexError> {
    let file = std::fs::File::open(path)?;
    parse(std::io::BufReader::new(file), callback)
}

/// Simulates loading of an Intel-HEX image.
///
/// Data records are delivered to `loader` with their absolute base
/// address (extended segment and linear base records are applied).
/// Returns the entrypoint indicated by a start address record, or 0 if
/// none was present.
pub fn load(reader: impl BufRead, mut loader: impl FnMut(u32, &[u8])) -> Result<u32, HexError> {
    let mut entrypoint = 0u32;
    let mut segment_base = 0u32;

    parse(reader, |record| {
        let record_type =
            RecordType::from_code(record.record_type).ok_or(HexError::UnsupportedRecord {
                record_type: record.record_type,
                line: record.line,
            })?;

        let expect_len = |len: usize| -> Result<(), HexError> {
            if record.data.len() != len {
                return Err(HexError::UnsupportedRecord {
                    record_type: record.record_type,
                    line: record.line,
                });
            }
            Ok(())
        };

        match record_type {
            RecordType::Data => {
                loader(segment_base + u32::from(record.address), &record.data);
            }
            RecordType::EndOfFile => return Ok(false),
            RecordType::ExtendedSegment => {
                expect_len(2)?;
                let segment = (u32::from(record.data[0]) << 8) | u32::from(record.data[1]);
                segment_base = segment * 0x10;
            }
            RecordType::StartSegment => {
                expect_len(4)?;
                let segment = (u32::from(record.data[0]) << 8) | u32::from(record.data[1]);
                let offset = (u32::from(record.data[2]) << 8) | u32::from(record.data[3]);
                entrypoint = segment * 0x10 + offset;
            }
            RecordType::ExtendedLinear => {
                expect_len(2)?;
                segment_base =
                    (u32::from(record.data[0]) << 24) | (u32::from(record.data[1]) << 16);
            }
            RecordType::StartLinear => {
                expect_len(4)?;
                entrypoint = (u32::from(record.data[0]) << 24)
                    | (u32::from(record.data[1]) << 16)
                    | (u32::from(record.data[2]) << 8)
                    | u32::from(record.data[3]);
            }
        }
        Ok(true)
    })?;

    Ok(entrypoint)
}

/// Loads an Intel-HEX image from a file.
pub fn load_file(path: impl AsRef<Path>, loader: impl FnMut(u32, &[u8])) -> Result<u32, HexError> {
    let file = std::fs::File::open(path)?;
    load(std::io::BufReader::new(file), loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SIMPLE: &str = ":0B0010006164647265737320676170A7\n:00000001FF\n";

    #[test]
    fn parses_data_record() {
        let mut records = Vec::new();
        parse(Cursor::new(SIMPLE), |r| {
            records.push(r.clone());
            Ok(true)
        })
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, 0x0010);
        assert_eq!(records[0].record_type, 0x00);
        assert_eq!(records[0].data, b"address gap");
        assert_eq!(records[1].record_type, 0x01);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "\n  \n:00000001FF\n\n";
        let mut count = 0;
        parse(Cursor::new(text), |_| {
            count += 1;
            Ok(true)
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let text = ":0B0010006164647265737320676170A8\n";
        let err = parse(Cursor::new(text), |_| Ok(true)).unwrap_err();
        assert!(matches!(err, HexError::Checksum { line: 1 }));
    }

    #[test]
    fn bad_start_character_is_rejected() {
        let err = parse(Cursor::new("00000001FF\n"), |_| Ok(true)).unwrap_err();
        assert!(matches!(err, HexError::Malformed { .. }));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let err = parse(Cursor::new(":0B001000616464\n"), |_| Ok(true)).unwrap_err();
        assert!(matches!(err, HexError::Malformed { .. }));
    }

    #[test]
    fn extra_data_is_rejected() {
        let err = parse(Cursor::new(":00000001FF00\n"), |_| Ok(true)).unwrap_err();
        assert!(matches!(err, HexError::Malformed { .. }));
    }

    #[test]
    fn invalid_hex_digit_is_rejected() {
        let err = parse(Cursor::new(":0000000GFF\n"), |_| Ok(true)).unwrap_err();
        assert!(matches!(err, HexError::Malformed { .. }));
    }

    #[test]
    fn load_applies_data_addresses() {
        let mut chunks = Vec::new();
        let entry = load(Cursor::new(SIMPLE), |addr, data| {
            chunks.push((addr, data.to_vec()));
        })
        .unwrap();

        assert_eq!(entry, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].0, 0x0010);
        assert_eq!(chunks[0].1, b"address gap");
    }

    #[test]
    fn load_applies_extended_linear_base() {
        // Base 0x1000_0000 via type-4 record, then 2 data bytes at 0x20.
        let text = ":020000041000EA\n:02002000AA55DF\n:00000001FF\n";
        let mut chunks = Vec::new();
        load(Cursor::new(text), |addr, data| {
            chunks.push((addr, data.to_vec()));
        })
        .unwrap();

        assert_eq!(chunks, vec![(0x1000_0020, vec![0xAA, 0x55])]);
    }

    #[test]
    fn load_applies_extended_segment_base() {
        // Segment 0x1234 -> base 0x12340.
        let text = ":020000021234B6\n:01000000EE11\n:00000001FF\n";
        let mut chunks = Vec::new();
        load(Cursor::new(text), |addr, data| {
            chunks.push((addr, data.to_vec()));
        })
        .unwrap();

        assert_eq!(chunks, vec![(0x12340, vec![0xEE])]);
    }

    #[test]
    fn load_returns_linear_entrypoint() {
        let text = ":0400000500001000E7\n:00000001FF\n";
        let entry = load(Cursor::new(text), |_, _| {}).unwrap();
        assert_eq!(entry, 0x0000_1000);
    }

    #[test]
    fn load_stops_at_eof_record() {
        let text = ":00000001FF\n:01000000EE11\n";
        let mut chunks = 0;
        load(Cursor::new(text), |_, _| chunks += 1).unwrap();
        assert_eq!(chunks, 0);
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let text = ":00000007F9\n";
        let err = load(Cursor::new(text), |_, _| {}).unwrap_err();
        assert!(matches!(
            err,
            HexError::UnsupportedRecord {
                record_type: 0x07,
                ..
            }
        ));
    }
}
