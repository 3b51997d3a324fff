//! Per-SLR state of the emulated configuration controller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::BitstreamError;

/// Frame write modes, selected by the NUL, WCFG and MFW commands.
///
/// Observation of uncompressed and compressed bitstreams shows that
/// freestanding FAR writes are prefixed by NUL, FDRI writes by WCFG, and
/// MFWR writes by MFW. Later FAR/FDRI pairs can overlap frames already
/// touched by FAR/MFWR pairs; in that case the frame data written first is
/// retained and the later overwrite attempt is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Frame writes are rejected (NUL).
    ReadOnly,
    /// FDRI writes are accepted; frames already configured are silently
    /// skipped. MFWR writes are rejected (WCFG).
    WriteOnce,
    /// FDRI and MFWR writes are accepted unconditionally (MFW).
    Overwrite,
}

/// Context (per-SLR) of the FPGA configuration engine.
///
/// Contexts stack when the configuration stream descends into the next
/// SLR; the outer context is restored verbatim when the inner stream
/// completes.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    /// SLR index (configuration order) of this context.
    slr_index: usize,
    /// Current frame address register value.
    far: u32,
    /// Last IDCODE seen on this context.
    idcode: Option<u32>,
    /// Active write mode.
    write_mode: WriteMode,
    /// Physical frame addresses already written in this SLR.
    written: HashSet<u32>,
}

impl ConfigContext {
    /// Creates a fresh context for the given SLR index.
    pub fn new(slr_index: usize) -> Self {
        Self {
            slr_index,
            far: 0,
            idcode: None,
            write_mode: WriteMode::ReadOnly,
            written: HashSet::new(),
        }
    }

    /// SLR index (configuration order) of this context.
    pub fn slr_index(&self) -> usize {
        self.slr_index
    }

    /// Current frame address register value.
    pub fn far(&self) -> u32 {
        self.far
    }

    /// Sets the frame address register.
    pub fn set_far(&mut self, far: u32) {
        self.far = far;
    }

    /// Last IDCODE seen on this context, if any.
    pub fn idcode(&self) -> Option<u32> {
        self.idcode
    }

    /// Records the IDCODE; a differing repeat write is rejected.
    pub fn set_idcode(&mut self, idcode: u32) -> Result<(), BitstreamError> {
        match self.idcode {
            Some(existing) if existing != idcode => Err(BitstreamError::IdcodeMismatch {
                expected: existing,
                found: idcode,
            }),
            _ => {
                self.idcode = Some(idcode);
                Ok(())
            }
        }
    }

    /// Active write mode.
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Switches the write mode (driven by the NUL/WCFG/MFW commands).
    pub fn set_write_mode(&mut self, mode: WriteMode) {
        self.write_mode = mode;
    }

    /// Tests whether a frame may be written under the current write mode.
    pub fn can_write_frame(&self, frame_addr: u32) -> bool {
        match self.write_mode {
            WriteMode::ReadOnly => false,
            WriteMode::WriteOnce => !self.written.contains(&frame_addr),
            WriteMode::Overwrite => true,
        }
    }

    /// Unconditionally marks a frame as written. Callers check
    /// [`can_write_frame`] first where the write mode matters.
    ///
    /// [`can_write_frame`]: ConfigContext::can_write_frame
    pub fn mark_frame_written(&mut self, frame_addr: u32) {
        self.written.insert(frame_addr);
    }

    /// Number of distinct frames written in this SLR so far.
    pub fn frames_written(&self) -> usize {
        self.written.len()
    }
}
