//! Implementation of the `xbit dump-bitstream` command.

use xbit_bitstream::{Bitstream, ConfigReg, Op, Packet, PacketKind, WordView};

use crate::GlobalArgs;

fn op_name(op: Op) -> &'static str {
    match op {
        Op::Nop => "NOP",
        Op::Read => "READ",
        Op::Write => "WRITE",
        Op::Reserved => "RSVD",
    }
}

fn print_packet(pkt: &Packet, payload: &WordView<'_>) {
    match pkt.kind {
        PacketKind::Sync => {
            println!("[{:08x}] 0x{:08X} SYNC", pkt.file_offset, pkt.header);
        }
        _ => {
            println!(
                "[{:08x}] 0x{:08X} SLR({}) {} {} ({} words)",
                pkt.file_offset,
                pkt.header,
                pkt.stream_index,
                op_name(pkt.op),
                ConfigReg::from_code(u32::from(pkt.reg)),
                pkt.word_count
            );
        }
    }

    // Hexdump of the payload, 32 bytes per line.
    let bytes = payload.as_bytes();
    for (offset, byte) in bytes.iter().enumerate() {
        if offset % 32 == 0 {
            print!("  +0x{offset:06x}");
        }
        print!(" {byte:02x}");
        if (offset + 1) % 32 == 0 {
            println!();
        }
    }
    if !bytes.is_empty() && bytes.len() % 32 != 0 {
        println!();
    }
}

/// Runs the `xbit dump-bitstream` command.
pub fn run(bitstream: &str, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let data = std::fs::read(bitstream)?;

    Bitstream::parse_packets(&data, |pkt, payload| {
        print_packet(pkt, payload);
        true
    })?;

    Ok(0)
}
