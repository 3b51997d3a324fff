//! xbit: command line tools for Xilinx FPGA bitstreams.
//!
//! Provides packet-level inspection (`dump-bitstream`, `analyze`), block
//! RAM content manipulation (`substitute-brams`, `inject-image`,
//! `dump-image`, `dump-brams`) and stream conversion
//! (`bitstream-to-readback`, `strip-crc-checks`).

#![warn(missing_docs)]

mod analyze;
mod dump;
mod dump_brams;
mod dump_image;
mod inject;
mod readback;
mod strip_crc;
mod substitute;

use std::process;

use clap::{Parser, Subcommand};

/// xbit inspects and rewrites Xilinx FPGA bitstreams.
#[derive(Parser, Debug)]
#[command(name = "xbit", version, about = "Xilinx bitstream toolkit")]
pub struct Cli {
    /// Suppress progress output (data output is unaffected).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dump the configuration packets of a bitstream.
    DumpBitstream {
        /// Bitstream file to dump.
        bitstream: String,
    },
    /// Analyze per-SLR register activity of a bitstream.
    Analyze {
        /// Bitstream file to analyze.
        bitstream: String,
    },
    /// Substitute all block RAM contents from a readback capture.
    SubstituteBrams {
        /// Output bitstream file.
        out: String,
        /// Bitstream providing the design.
        bitstream: String,
        /// Raw readback file providing the block RAM contents
        /// (read_back_hw_device -bin_file).
        readback: String,
    },
    /// Inject an Intel-HEX image into the block RAMs of a memory map.
    InjectImage {
        /// Output bitstream file.
        out: String,
        /// Bitstream providing the design.
        bitstream: String,
        /// MMI memory map file.
        mmi: String,
        /// Instance path of the target memory in the MMI file.
        instance: String,
        /// Intel-HEX image to inject.
        ihex: String,
    },
    /// Dump the contents of a memory-mapped instance as a hex dump.
    DumpImage {
        /// Bitstream to read from.
        bitstream: String,
        /// MMI memory map file.
        mmi: String,
        /// Instance path of the memory in the MMI file.
        instance: String,
    },
    /// Dump INIT/INITP strings for every block RAM of the device.
    DumpBrams {
        /// Bitstream to read from.
        bitstream: String,
    },
    /// Convert a bitstream into a simulated raw readback file.
    BitstreamToReadback {
        /// Output readback file.
        out: String,
        /// Input bitstream (or readback command stream).
        bitstream: String,
    },
    /// Strip all CRC check commands from a bitstream.
    StripCrcChecks {
        /// Output bitstream file.
        out: String,
        /// Input bitstream.
        bitstream: String,
    },
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress progress output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Command::DumpBitstream { ref bitstream } => dump::run(bitstream, &global),
        Command::Analyze { ref bitstream } => analyze::run(bitstream, &global),
        Command::SubstituteBrams {
            ref out,
            ref bitstream,
            ref readback,
        } => substitute::run(out, bitstream, readback, &global),
        Command::InjectImage {
            ref out,
            ref bitstream,
            ref mmi,
            ref instance,
            ref ihex,
        } => inject::run(out, bitstream, mmi, instance, ihex, &global),
        Command::DumpImage {
            ref bitstream,
            ref mmi,
            ref instance,
        } => dump_image::run(bitstream, mmi, instance, &global),
        Command::DumpBrams { ref bitstream } => dump_brams::run(bitstream, &global),
        Command::BitstreamToReadback {
            ref out,
            ref bitstream,
        } => readback::run(out, bitstream, &global),
        Command::StripCrcChecks {
            ref out,
            ref bitstream,
        } => strip_crc::run(out, bitstream, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_dump_bitstream() {
        let cli = Cli::parse_from(["xbit", "dump-bitstream", "design.bit"]);
        match cli.command {
            Command::DumpBitstream { bitstream } => assert_eq!(bitstream, "design.bit"),
            _ => panic!("expected DumpBitstream command"),
        }
    }

    #[test]
    fn parse_analyze() {
        let cli = Cli::parse_from(["xbit", "analyze", "design.bit"]);
        assert!(matches!(cli.command, Command::Analyze { .. }));
    }

    #[test]
    fn parse_substitute_brams() {
        let cli = Cli::parse_from([
            "xbit",
            "substitute-brams",
            "out.bit",
            "design.bit",
            "readback.bin",
        ]);
        match cli.command {
            Command::SubstituteBrams {
                out,
                bitstream,
                readback,
            } => {
                assert_eq!(out, "out.bit");
                assert_eq!(bitstream, "design.bit");
                assert_eq!(readback, "readback.bin");
            }
            _ => panic!("expected SubstituteBrams command"),
        }
    }

    #[test]
    fn parse_inject_image() {
        let cli = Cli::parse_from([
            "xbit",
            "inject-image",
            "out.bit",
            "design.bit",
            "design.mmi",
            "cpu0",
            "firmware.hex",
        ]);
        match cli.command {
            Command::InjectImage {
                out,
                bitstream,
                mmi,
                instance,
                ihex,
            } => {
                assert_eq!(out, "out.bit");
                assert_eq!(bitstream, "design.bit");
                assert_eq!(mmi, "design.mmi");
                assert_eq!(instance, "cpu0");
                assert_eq!(ihex, "firmware.hex");
            }
            _ => panic!("expected InjectImage command"),
        }
    }

    #[test]
    fn parse_dump_image() {
        let cli = Cli::parse_from(["xbit", "dump-image", "design.bit", "design.mmi", "cpu0"]);
        assert!(matches!(cli.command, Command::DumpImage { .. }));
    }

    #[test]
    fn parse_dump_brams() {
        let cli = Cli::parse_from(["xbit", "dump-brams", "design.bit"]);
        assert!(matches!(cli.command, Command::DumpBrams { .. }));
    }

    #[test]
    fn parse_bitstream_to_readback() {
        let cli = Cli::parse_from(["xbit", "bitstream-to-readback", "out.rbb", "design.bit"]);
        assert!(matches!(cli.command, Command::BitstreamToReadback { .. }));
    }

    #[test]
    fn parse_strip_crc_checks() {
        let cli = Cli::parse_from(["xbit", "strip-crc-checks", "out.bit", "design.bit"]);
        assert!(matches!(cli.command, Command::StripCrcChecks { .. }));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["xbit", "--quiet", "analyze", "design.bit"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);

        let cli = Cli::parse_from(["xbit", "-v", "analyze", "design.bit"]);
        assert!(cli.verbose);
    }
}
