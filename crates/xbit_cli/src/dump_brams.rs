//! Implementation of the `xbit dump-brams` command.
//!
//! Prints the data and parity contents of every RAMB36 tile as INIT_xx
//! and INITP_xx strings in the format used by block RAM primitives.

use xbit_bitstream::Bitstream;
use xbit_device::{Bram, BramKind};

use crate::GlobalArgs;

const LINE_WIDTH: usize = 32;

fn dump_ram_data(bs: &Bitstream, ram: &Bram<'_>, is_parity: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = ram.extract(bs, is_parity)?;
    let prefix = if is_parity { "INITP_" } else { "INIT_" };

    for (index, chunk) in data.chunks(LINE_WIDTH).enumerate() {
        let mut line = [0u8; LINE_WIDTH];
        line[..chunk.len()].copy_from_slice(chunk);

        print!("{prefix}{index:02x}: {}'h", LINE_WIDTH * 8);
        // INIT/INITP strings print the line in reversed byte order.
        for byte in line.iter().rev() {
            print!("{byte:02x}");
        }
        println!();
    }

    Ok(())
}

/// Runs the `xbit dump-brams` command.
pub fn run(bitstream: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("loading bitstream ...");
    }
    let bs = Bitstream::load_config_file(bitstream, None, false)?;

    let idcode = bs
        .idcode()
        .ok_or("bitstream does not identify its device (no IDCODE)")?;
    let device = xbit_device::lookup(idcode)?;
    if !global.quiet {
        eprintln!("fpga: {}", device.name);
    }

    for index in 0..device.num_brams(BramKind::Ramb36) {
        let ram = device.bram(BramKind::Ramb36, index)?;
        println!("{ram}:");
        dump_ram_data(&bs, &ram, false)?;
        dump_ram_data(&bs, &ram, true)?;
        println!();
    }

    Ok(0)
}
