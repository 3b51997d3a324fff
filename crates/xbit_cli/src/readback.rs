//! Implementation of the `xbit bitstream-to-readback` command.
//!
//! Performs a virtual readback: the frame data of all SLRs is written
//! out in configuration order, simulating the data file produced by the
//! `read_back_hw_device` command. The input may be a configuration
//! bitstream or a readback command stream.

use xbit_bitstream::Bitstream;

use crate::GlobalArgs;

/// Runs the `xbit bitstream-to-readback` command.
pub fn run(
    out: &str,
    bitstream: &str,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("loading bitstream ...");
    }
    let bs = Bitstream::load_config_file(bitstream, None, true)?;

    if !global.quiet {
        eprintln!("writing simulated readback file ...");
    }
    bs.save_as_readback_file(out)?;

    Ok(0)
}
