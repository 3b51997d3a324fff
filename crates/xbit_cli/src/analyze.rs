//! Implementation of the `xbit analyze` command.
//!
//! Replays the bitstream through the configuration engine and reports
//! per-SLR register activity: IDCODEs, command sequences, frame address
//! updates and frame write counts.

use std::collections::BTreeMap;

use xbit_bitstream::{
    ConfigCmd, ConfigContext, ConfigEngine, ConfigReg, ConfigVisitor, WordView,
};

use crate::GlobalArgs;

/// Per-SLR tallies collected during the walk.
#[derive(Default)]
struct SlrStats {
    frames_written: usize,
    frames_skipped: usize,
    mfwr_writes: usize,
    readback_words: usize,
}

struct Analyzer {
    verbose: bool,
    stats: BTreeMap<usize, SlrStats>,
}

impl Analyzer {
    fn new(verbose: bool) -> Self {
        Self {
            verbose,
            stats: BTreeMap::new(),
        }
    }

    fn stats_mut(&mut self, slr: usize) -> &mut SlrStats {
        self.stats.entry(slr).or_default()
    }
}

impl ConfigVisitor for Analyzer {
    fn cmd(&mut self, ctx: &ConfigContext, cmd: ConfigCmd, _args: &WordView<'_>) -> bool {
        println!("SLR({}) CMD {}", ctx.slr_index(), cmd);
        true
    }

    fn idcode(&mut self, ctx: &ConfigContext, idcode: u32) -> bool {
        match xbit_device::lookup(idcode) {
            Ok(device) => println!(
                "SLR({}) IDCODE 0x{:08X} ({})",
                ctx.slr_index(),
                idcode,
                device.name
            ),
            Err(_) => println!("SLR({}) IDCODE 0x{:08X} (unknown)", ctx.slr_index(), idcode),
        }
        true
    }

    fn far(&mut self, ctx: &ConfigContext, far: u32) -> bool {
        if self.verbose {
            println!("SLR({}) FAR 0x{:08X}", ctx.slr_index(), far);
        }
        true
    }

    fn frame(&mut self, ctx: &ConfigContext, frame_addr: u32, data: &WordView<'_>) -> bool {
        if self.verbose {
            println!(
                "SLR({}) FRAME 0x{:08X} ({} words)",
                ctx.slr_index(),
                frame_addr,
                data.len()
            );
        }
        self.stats_mut(ctx.slr_index()).frames_written += 1;
        true
    }

    fn frame_skipped(&mut self, ctx: &ConfigContext, frame_addr: u32) -> bool {
        if self.verbose {
            println!(
                "SLR({}) FRAME 0x{:08X} retained (already configured)",
                ctx.slr_index(),
                frame_addr
            );
        }
        self.stats_mut(ctx.slr_index()).frames_skipped += 1;
        true
    }

    fn mfwr(&mut self, ctx: &ConfigContext, frame_addr: u32, _args: &WordView<'_>) -> bool {
        if self.verbose {
            println!("SLR({}) MFWR 0x{:08X}", ctx.slr_index(), frame_addr);
        }
        self.stats_mut(ctx.slr_index()).mfwr_writes += 1;
        true
    }

    fn readback(&mut self, ctx: &ConfigContext, data: &WordView<'_>) -> bool {
        println!(
            "SLR({}) FDRO readback ({} words)",
            ctx.slr_index(),
            data.len()
        );
        self.stats_mut(ctx.slr_index()).readback_words += data.len();
        true
    }

    fn write(&mut self, ctx: &ConfigContext, reg: ConfigReg, data: &WordView<'_>) -> bool {
        match data.len() {
            1 => {
                // Single-word register writes are the common case and
                // worth showing inline.
                if let Ok(value) = data.word(0) {
                    println!(
                        "SLR({}) WRITE {} = 0x{:08X}",
                        ctx.slr_index(),
                        reg,
                        value
                    );
                }
            }
            n => println!("SLR({}) WRITE {} ({n} words)", ctx.slr_index(), reg),
        }
        true
    }

    fn read(&mut self, ctx: &ConfigContext, reg: ConfigReg, data: &WordView<'_>) -> bool {
        println!(
            "SLR({}) READ {} ({} words)",
            ctx.slr_index(),
            reg,
            data.len()
        );
        true
    }
}

/// Runs the `xbit analyze` command.
pub fn run(bitstream: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let data = std::fs::read(bitstream)?;

    let mut analyzer = Analyzer::new(global.verbose);
    let completed = ConfigEngine::new(&mut analyzer).process(&data)?;

    for (slr, stats) in &analyzer.stats {
        println!(
            "SLR({slr}) summary: {} frames written, {} retained, {} MFWR writes, {} readback words",
            stats.frames_written, stats.frames_skipped, stats.mfwr_writes, stats.readback_words
        );
    }

    if !completed {
        eprintln!("warning: analysis stopped before the end of the stream");
    }

    Ok(0)
}
