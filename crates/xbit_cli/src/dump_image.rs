//! Implementation of the `xbit dump-image` command.
//!
//! Reads the contents of a memory-mapped instance back out of a
//! bitstream and prints them as a conventional hex dump.

use xbit_bitstream::Bitstream;
use xbit_mmi::MemoryMap;

use crate::GlobalArgs;

/// Runs the `xbit dump-image` command.
pub fn run(
    bitstream: &str,
    mmi: &str,
    instance: &str,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
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

    let map: MemoryMap = xbit_mmi::load(mmi, instance)?;

    for space in &map.spaces {
        println!(
            "{} [0x{:08X}..0x{:08X}]",
            space.name, space.start_byte, space.end_byte
        );

        let mut line = Vec::with_capacity(16);
        for addr in space.start_byte..=space.end_byte {
            line.push(map.read_byte(device, &bs, addr)?);

            if line.len() == 16 || addr == space.end_byte {
                let line_addr = addr + 1 - line.len() as u64;
                print!("  {line_addr:08x}:");
                for byte in &line {
                    print!(" {byte:02x}");
                }
                println!();
                line.clear();
            }
        }
    }

    Ok(0)
}
