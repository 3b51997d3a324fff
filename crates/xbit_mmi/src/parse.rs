//! MMI (Memory Map Information) XML reading.
//!
//! MMI files are emitted by the vendor implementation tools and describe
//! how a processor's address spaces map onto placed block RAM primitives:
//!
//! ```text
//! <MemInfo>
//!   <Processor Endianness="Little" InstPath="design/cpu0">
//!     <AddressSpace Name="bram" Begin="0" End="8191">
//!       <BusBlock>
//!         <BitLane MemType="RAMB36" Placement="X0Y0">
//!           <DataWidth MSB="15" LSB="0"/>
//!           <AddressRange Begin="0" End="2047"/>
//!           <Parity ON="false" NumBits="0"/>
//!         </BitLane>
//!         ...
//! ```
//!
//! `<MemoryArray>` elements (XPM memory macros) use the same address
//! space structure without an endianness attribute.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use std::path::Path;

use xbit_device::BramKind;

use crate::error::MmiError;
use crate::model::{AddressSpace, BitLane, Endianness, MemoryMap};

fn xml_err(e: impl std::fmt::Display) -> MmiError {
    MmiError::Xml(e.to_string())
}

/// Gets a required attribute as a UTF-8 string.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, MmiError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(xml_err)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn require_attribute(element: &BytesStart<'_>, name: &str) -> Result<String, MmiError> {
    attribute(element, name)?.ok_or_else(|| {
        MmiError::Malformed(format!(
            "element <{}> is missing the {} attribute",
            String::from_utf8_lossy(element.name().as_ref()),
            name
        ))
    })
}

fn attribute_u64(element: &BytesStart<'_>, name: &str) -> Result<u64, MmiError> {
    let text = require_attribute(element, name)?;
    text.parse::<u64>()
        .map_err(|_| MmiError::Malformed(format!("attribute {name}=\"{text}\" is not a number")))
}

/// Parses a `Placement="X<u>Y<v>"` attribute value.
fn parse_placement(text: &str) -> Result<(u32, u32), MmiError> {
    let bad = || MmiError::Malformed(format!("unrecognized block RAM placement \"{text}\""));

    let rest = text.strip_prefix('X').ok_or_else(bad)?;
    let (x, y) = rest.split_once('Y').ok_or_else(bad)?;
    Ok((
        x.parse::<u32>().map_err(|_| bad())?,
        y.parse::<u32>().map_err(|_| bad())?,
    ))
}

/// Parses the attributes of one `<BitLane>` element and its children up
/// to the matching end tag.
fn parse_bit_lane(
    reader: &mut Reader<&[u8]>,
    lane_start: &BytesStart<'_>,
) -> Result<BitLane, MmiError> {
    let mem_type = require_attribute(lane_start, "MemType")?;
    let kind = match mem_type.as_str() {
        "RAMB36" => BramKind::Ramb36,
        "RAMB18" => BramKind::Ramb18,
        _ => {
            return Err(MmiError::Malformed(format!(
                "unrecognized block RAM type \"{mem_type}\""
            )))
        }
    };
    let (x, y) = parse_placement(&require_attribute(lane_start, "Placement")?)?;

    let mut msb: Option<u64> = None;
    let mut lsb: Option<u64> = None;
    let mut range: Option<(u64, u64)> = None;
    let mut parity_bits = 0u64;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"DataWidth" => {
                    msb = Some(attribute_u64(&e, "MSB")?);
                    lsb = Some(attribute_u64(&e, "LSB")?);
                }
                b"AddressRange" => {
                    range = Some((attribute_u64(&e, "Begin")?, attribute_u64(&e, "End")?));
                }
                b"Parity" => {
                    let on = attribute(&e, "ON")?.unwrap_or_default();
                    parity_bits = if on.eq_ignore_ascii_case("true") {
                        attribute_u64(&e, "NumBits")?
                    } else {
                        0
                    };
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"BitLane" => break,
            Event::Eof => {
                return Err(MmiError::Malformed("unterminated <BitLane> element".into()))
            }
            _ => {}
        }
    }

    let (mut msb, mut lsb) = match (msb, lsb) {
        (Some(m), Some(l)) => (m, l),
        _ => {
            return Err(MmiError::Malformed(
                "<BitLane> is missing its <DataWidth> slice".into(),
            ))
        }
    };
    let (start_word, end_word) = range.ok_or_else(|| {
        MmiError::Malformed("<BitLane> is missing its <AddressRange> element".into())
    })?;

    if end_word < start_word {
        return Err(MmiError::Malformed(
            "end address of bit lane below start address".into(),
        ));
    }

    // LSB above MSB marks a bit-reversed lane; store it normalized.
    let bit_reversed = msb < lsb;
    if bit_reversed {
        std::mem::swap(&mut msb, &mut lsb);
    }

    Ok(BitLane {
        kind,
        x,
        y,
        msb: msb as u32,
        lsb: lsb as u32,
        bit_reversed,
        start_word: start_word as u32,
        end_word: end_word as u32,
        parity_bits: parity_bits as u32,
    })
}

/// Parses one `<AddressSpace>` element including all of its bus blocks.
fn parse_address_space(
    reader: &mut Reader<&[u8]>,
    space_start: &BytesStart<'_>,
) -> Result<AddressSpace, MmiError> {
    let name = require_attribute(space_start, "Name")?;
    let start_byte = attribute_u64(space_start, "Begin")?;
    let end_byte = attribute_u64(space_start, "End")?;

    let mut lanes = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.name().as_ref() == b"BitLane" => {
                lanes.push(parse_bit_lane(reader, &e)?);
            }
            Event::End(e) if e.name().as_ref() == b"AddressSpace" => break,
            Event::Eof => {
                return Err(MmiError::Malformed(
                    "unterminated <AddressSpace> element".into(),
                ))
            }
            _ => {}
        }
    }

    // The space's word size is spanned by the lane slices.
    let word_msb = lanes.iter().map(|l| l.msb).max();
    let word_lsb = lanes.iter().map(|l| l.lsb).min();
    let (word_msb, word_lsb) = match (word_msb, word_lsb) {
        (Some(m), Some(l)) if l <= m => (m, l),
        _ => {
            return Err(MmiError::Malformed(format!(
                "address space \"{name}\" defines no bit lanes"
            )))
        }
    };

    let word_size = word_msb - word_lsb + 1;
    if word_size % 8 != 0 {
        return Err(MmiError::Malformed(format!(
            "address space \"{name}\" has a word size of {word_size} bits (not a multiple of 8)"
        )));
    }

    let total_bit_size = (end_byte - start_byte + 1) * 8;
    if total_bit_size % u64::from(word_size) != 0 {
        return Err(MmiError::Malformed(format!(
            "total bit size of address space \"{name}\" is not an integer multiple of its word size"
        )));
    }

    Ok(AddressSpace {
        name,
        start_byte,
        end_byte,
        word_size,
        total_words: total_bit_size / u64::from(word_size),
        lanes,
    })
}

/// Parses the address spaces of a matched instance element.
fn parse_instance(
    reader: &mut Reader<&[u8]>,
    instance: String,
    endianness: Option<Endianness>,
    end_tag: &[u8],
) -> Result<MemoryMap, MmiError> {
    let mut spaces = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.name().as_ref() == b"AddressSpace" => {
                spaces.push(parse_address_space(reader, &e)?);
            }
            Event::End(e) if e.name().as_ref() == end_tag => break,
            Event::Eof => return Err(MmiError::Malformed("unterminated instance element".into())),
            _ => {}
        }
    }

    spaces.sort_by_key(|s| s.start_byte);

    Ok(MemoryMap {
        instance,
        endianness,
        spaces,
    })
}

fn parse_endianness(element: &BytesStart<'_>) -> Result<Option<Endianness>, MmiError> {
    match attribute(element, "Endianness")?.as_deref() {
        Some("Little") => Ok(Some(Endianness::Little)),
        Some("Big") => Ok(Some(Endianness::Big)),
        Some(other) => Err(MmiError::Malformed(format!(
            "unrecognized processor endianness \"{other}\""
        ))),
        None => Ok(None),
    }
}

/// Parses an MMI document and extracts the memory map of `instance`.
pub fn parse_str(text: &str, instance: &str) -> Result<MemoryMap, MmiError> {
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                tag @ (b"Processor" | b"MemoryArray") => {
                    let inst_path = require_attribute(&e, "InstPath")?;
                    if inst_path == instance {
                        let endianness = if tag == b"Processor" {
                            parse_endianness(&e)?
                        } else {
                            None
                        };
                        let end_tag = tag.to_vec();
                        return parse_instance(&mut reader, inst_path, endianness, &end_tag);
                    }
                    reader.read_to_end(e.name()).map_err(xml_err)?;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Err(MmiError::UnknownInstance(instance.to_string()))
}

/// Loads the memory map of `instance` from an MMI file.
pub fn load(path: impl AsRef<Path>, instance: &str) -> Result<MemoryMap, MmiError> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text, instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MemInfo Version="1" Minor="5">
  <Processor Endianness="Little" InstPath="design_1_i/cpu0">
    <AddressSpace Name="cpu0.bram" Begin="4096" End="8191">
      <BusBlock>
        <BitLane MemType="RAMB36" Placement="X0Y0">
          <DataWidth MSB="15" LSB="0"/>
          <AddressRange Begin="0" End="1023"/>
          <Parity ON="false" NumBits="0"/>
        </BitLane>
        <BitLane MemType="RAMB36" Placement="X1Y0">
          <DataWidth MSB="31" LSB="16"/>
          <AddressRange Begin="0" End="1023"/>
          <Parity ON="false" NumBits="0"/>
        </BitLane>
      </BusBlock>
    </AddressSpace>
  </Processor>
  <MemoryArray InstPath="xpm_mem">
    <AddressSpace Name="xpm_mem.mem" Begin="0" End="2047">
      <BusBlock>
        <BitLane MemType="RAMB18" Placement="X2Y5">
          <DataWidth MSB="0" LSB="7"/>
          <AddressRange Begin="0" End="2047"/>
          <Parity ON="true" NumBits="1"/>
        </BitLane>
      </BusBlock>
    </AddressSpace>
  </MemoryArray>
  <Config>
    <Option Name="Part" Val="xc7z020clg400-1"/>
  </Config>
</MemInfo>
"#;

    #[test]
    fn parses_processor_instance() {
        let map = parse_str(DOC, "design_1_i/cpu0").unwrap();
        assert_eq!(map.instance, "design_1_i/cpu0");
        assert_eq!(map.endianness, Some(Endianness::Little));
        assert_eq!(map.spaces.len(), 1);

        let space = &map.spaces[0];
        assert_eq!(space.name, "cpu0.bram");
        assert_eq!(space.start_byte, 4096);
        assert_eq!(space.end_byte, 8191);
        assert_eq!(space.word_size, 32);
        assert_eq!(space.total_words, 1024);
        assert_eq!(space.lanes.len(), 2);

        let low = &space.lanes[0];
        assert_eq!(low.kind, BramKind::Ramb36);
        assert_eq!((low.x, low.y), (0, 0));
        assert_eq!((low.msb, low.lsb), (15, 0));
        assert!(!low.bit_reversed);
        assert_eq!((low.start_word, low.end_word), (0, 1023));
    }

    #[test]
    fn parses_memory_array_with_reversed_lane() {
        let map = parse_str(DOC, "xpm_mem").unwrap();
        assert_eq!(map.endianness, None);
        let lane = &map.spaces[0].lanes[0];
        assert_eq!(lane.kind, BramKind::Ramb18);
        assert_eq!((lane.x, lane.y), (2, 5));
        // Declared MSB=0 LSB=7: stored normalized with the reversal flag.
        assert_eq!((lane.msb, lane.lsb), (7, 0));
        assert!(lane.bit_reversed);
        assert_eq!(lane.parity_bits, 1);
    }

    #[test]
    fn unknown_instance_fails() {
        let err = parse_str(DOC, "nonexistent").unwrap_err();
        assert!(matches!(err, MmiError::UnknownInstance(_)));
    }

    #[test]
    fn malformed_placement_fails() {
        let doc = DOC.replace("X0Y0", "Z0Y0");
        let err = parse_str(&doc, "design_1_i/cpu0").unwrap_err();
        assert!(matches!(err, MmiError::Malformed(_)));
    }

    #[test]
    fn missing_data_width_fails() {
        let doc = DOC.replace("<DataWidth MSB=\"15\" LSB=\"0\"/>", "");
        let err = parse_str(&doc, "design_1_i/cpu0").unwrap_err();
        assert!(matches!(err, MmiError::Malformed(_)));
    }

    #[test]
    fn non_byte_word_size_fails() {
        let doc = DOC.replace("MSB=\"31\"", "MSB=\"28\"");
        let err = parse_str(&doc, "design_1_i/cpu0").unwrap_err();
        assert!(matches!(err, MmiError::Malformed(_)));
    }

    #[test]
    fn reversed_address_range_fails() {
        let doc = DOC.replace(
            "<AddressRange Begin=\"0\" End=\"1023\"/>",
            "<AddressRange Begin=\"1023\" End=\"0\"/>",
        );
        let err = parse_str(&doc, "design_1_i/cpu0").unwrap_err();
        assert!(matches!(err, MmiError::Malformed(_)));
    }

    #[test]
    fn spaces_are_sorted_by_start_address() {
        let doc = r#"<MemInfo>
  <Processor Endianness="Big" InstPath="p">
    <AddressSpace Name="hi" Begin="8192" End="8195">
      <BusBlock>
        <BitLane MemType="RAMB36" Placement="X0Y1">
          <DataWidth MSB="7" LSB="0"/>
          <AddressRange Begin="0" End="3"/>
          <Parity ON="false" NumBits="0"/>
        </BitLane>
      </BusBlock>
    </AddressSpace>
    <AddressSpace Name="lo" Begin="0" End="3">
      <BusBlock>
        <BitLane MemType="RAMB36" Placement="X0Y0">
          <DataWidth MSB="7" LSB="0"/>
          <AddressRange Begin="0" End="3"/>
          <Parity ON="false" NumBits="0"/>
        </BitLane>
      </BusBlock>
    </AddressSpace>
  </Processor>
</MemInfo>"#;
        let map = parse_str(doc, "p").unwrap();
        assert_eq!(map.spaces[0].name, "lo");
        assert_eq!(map.spaces[1].name, "hi");
    }
}
