//! Implementation of the `xbit strip-crc-checks` command.

use xbit_bitstream::Bitstream;

use crate::GlobalArgs;

/// Runs the `xbit strip-crc-checks` command.
pub fn run(
    out: &str,
    bitstream: &str,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("loading bitstream ...");
    }
    let mut bs = Bitstream::load_config_file(bitstream, None, true)?;

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
