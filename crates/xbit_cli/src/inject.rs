//! Implementation of the `xbit inject-image` command.
//!
//! Loads an Intel-HEX firmware image into the block RAM cells backing a
//! processor memory, using the MMI memory map to translate addresses.
//! The CRC check commands of the result are stripped, since the frame
//! data no longer matches them.

use std::io::BufReader;

use xbit_bitstream::Bitstream;
use xbit_mmi::MemoryMap;

use crate::GlobalArgs;

/// Runs the `xbit inject-image` command.
pub fn run(
    out: &str,
    bitstream: &str,
    mmi: &str,
    instance: &str,
    ihex: &str,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("loading bitstream ...");
    }
    let mut bs = Bitstream::load_config_file(bitstream, None, false)?;

    let idcode = bs
        .idcode()
        .ok_or("bitstream does not identify its device (no IDCODE)")?;
    let device = xbit_device::lookup(idcode)?;
    if !global.quiet {
        eprintln!("fpga: {}", device.name);
    }

    let map: MemoryMap = xbit_mmi::load(mmi, instance)?;
    if !global.quiet {
        eprintln!(
            "memory map: {} ({} bytes in {} address spaces)",
            map.instance,
            map.total_bytes(),
            map.spaces.len()
        );
    }

    if !global.quiet {
        eprintln!("injecting image ...");
    }
    let file = std::fs::File::open(ihex)?;
    let mut injected = 0u64;
    let mut result: Result<(), xbit_mmi::MmiError> = Ok(());

    let entrypoint = xbit_ihex::load(BufReader::new(file), |addr, data| {
        if result.is_err() {
            return;
        }
        for (i, &byte) in data.iter().enumerate() {
            if let Err(e) = map.write_byte(device, &mut bs, u64::from(addr) + i as u64, byte) {
                result = Err(e);
                return;
            }
            injected += 1;
        }
    })?;
    result?;

    if !global.quiet {
        eprintln!("injected {injected} bytes (entrypoint 0x{entrypoint:08X})");
    }

    if !global.quiet {
        eprintln!("stripping crc checks ...");
    }
    bs.strip_crc_checks()?;

    if !global.quiet {
        eprintln!("writing result bitstream ...");
    }
    bs.save_file(out)?;

    Ok(0)
}
