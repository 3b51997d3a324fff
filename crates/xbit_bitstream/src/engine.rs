//! Emulation of the FPGA configuration controller.
//!
//! The engine walks the packet stream and replays the controller's
//! register-level behavior: CMD writes drive the frame write mode, FAR and
//! IDCODE writes update the per-SLR context, FDRI payloads are split into
//! frames and checked against the write bitmap, and writes to register
//! 0x1E recurse into the encapsulated stream of the next SLR. Semantic
//! events are delivered to a [`ConfigVisitor`]; every hook can halt the
//! walk by returning `false`, which is cooperative cancellation rather
//! than an error.

use crate::buffer::WordView;
use crate::context::{ConfigContext, WriteMode};
use crate::error::BitstreamError;
use crate::packet::{Op, Packet, PacketParser};
use crate::regs::{ConfigCmd, ConfigReg};

/// Semantic configuration events produced by the [`ConfigEngine`].
///
/// All hooks default to "keep going"; implementors override what they
/// care about. Returning `false` from any hook halts the walk cleanly.
#[allow(unused_variables)]
pub trait ConfigVisitor {
    /// Every decoded packet, before semantic dispatch.
    fn packet(&mut self, ctx: &ConfigContext, pkt: &Packet) -> bool {
        true
    }

    /// A command register write (`args` holds any words after the code).
    fn cmd(&mut self, ctx: &ConfigContext, cmd: ConfigCmd, args: &WordView<'_>) -> bool {
        true
    }

    /// An IDCODE register write (already recorded in the context).
    fn idcode(&mut self, ctx: &ConfigContext, idcode: u32) -> bool {
        true
    }

    /// A frame address register write (already recorded in the context).
    fn far(&mut self, ctx: &ConfigContext, far: u32) -> bool {
        true
    }

    /// An accepted frame write at `frame_addr` (FDRI data).
    fn frame(&mut self, ctx: &ConfigContext, frame_addr: u32, data: &WordView<'_>) -> bool {
        true
    }

    /// A frame write that was skipped because the frame is already
    /// configured (write-once mode).
    fn frame_skipped(&mut self, ctx: &ConfigContext, frame_addr: u32) -> bool {
        true
    }

    /// An accepted multi-frame write at `frame_addr` (replays the frame
    /// most recently written through FDRI).
    fn mfwr(&mut self, ctx: &ConfigContext, frame_addr: u32, args: &WordView<'_>) -> bool {
        true
    }

    /// An FDRO read carrying expected readback data.
    fn readback(&mut self, ctx: &ConfigContext, data: &WordView<'_>) -> bool {
        true
    }

    /// A write to a register with no modeled semantics.
    fn write(&mut self, ctx: &ConfigContext, reg: ConfigReg, data: &WordView<'_>) -> bool {
        true
    }

    /// A read from a register other than FDRO.
    fn read(&mut self, ctx: &ConfigContext, reg: ConfigReg, data: &WordView<'_>) -> bool {
        true
    }
}

fn no_context() -> BitstreamError {
    BitstreamError::Unsupported("no active configuration context".into())
}

/// Replays a configuration stream against stacked per-SLR contexts.
pub struct ConfigEngine<'v, V: ConfigVisitor> {
    visitor: &'v mut V,
    stack: Vec<ConfigContext>,
    /// Frame length in words, latched from the device catalog once an
    /// IDCODE of a known part is seen.
    frame_words: Option<usize>,
    /// Copy of the most recent FDRI frame (MFWR data source).
    last_frame: Option<Vec<u32>>,
}

impl<'v, V: ConfigVisitor> ConfigEngine<'v, V> {
    /// Creates an engine delivering events to `visitor`.
    pub fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            stack: Vec::new(),
            frame_words: None,
            last_frame: None,
        }
    }

    /// Processes a complete bitstream buffer.
    ///
    /// Returns `Ok(true)` when the stream was consumed to the end and
    /// `Ok(false)` when a visitor hook requested a halt.
    pub fn process(&mut self, bytes: &[u8]) -> Result<bool, BitstreamError> {
        self.stack.push(ConfigContext::new(0));
        let result = self.process_span(bytes, 0);
        self.stack.pop();
        result
    }

    /// Parses one (sub-)bitstream span, starting unsynchronized.
    fn process_span(&mut self, bytes: &[u8], base_offset: usize) -> Result<bool, BitstreamError> {
        let stream_index = self.context()?.slr_index();
        let mut parser = PacketParser::new(bytes, base_offset).with_stream_index(stream_index);

        while let Some((pkt, payload)) = parser.next_packet()? {
            if !self.dispatch(&pkt, &payload)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn context(&self) -> Result<&ConfigContext, BitstreamError> {
        self.stack.last().ok_or_else(no_context)
    }

    fn context_mut(&mut self) -> Result<&mut ConfigContext, BitstreamError> {
        self.stack.last_mut().ok_or_else(no_context)
    }

    /// Invokes a visitor hook with the active context. Split borrows of
    /// the visitor and the context stack keep the call sites clean.
    fn visit<R>(
        &mut self,
        f: impl FnOnce(&mut V, &ConfigContext) -> R,
    ) -> Result<R, BitstreamError> {
        let ctx = self.stack.last().ok_or_else(no_context)?;
        Ok(f(&mut *self.visitor, ctx))
    }

    fn dispatch(&mut self, pkt: &Packet, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if !self.visit(|v, ctx| v.packet(ctx, pkt))? {
            return Ok(false);
        }

        let reg = ConfigReg::from_code(u32::from(pkt.reg));
        match (pkt.op, reg) {
            (Op::Write, ConfigReg::CMD) => self.on_cmd(payload),
            (Op::Write, ConfigReg::IDCODE) => self.on_idcode(payload),
            (Op::Write, ConfigReg::FAR) => self.on_far(payload),
            (Op::Write, ConfigReg::FDRI) => self.on_fdri(payload),
            (Op::Write, ConfigReg::MFWR) => self.on_mfwr(payload),
            (Op::Write, ConfigReg::RSVD30) if !payload.is_empty() => self.on_next_slr(pkt, payload),
            (Op::Write, _) => self.visit(|v, ctx| v.write(ctx, reg, payload)),
            (Op::Read, ConfigReg::FDRO) if !payload.is_empty() => {
                self.visit(|v, ctx| v.readback(ctx, payload))
            }
            (Op::Read, _) => self.visit(|v, ctx| v.read(ctx, reg, payload)),
            _ => Ok(true),
        }
    }

    fn on_cmd(&mut self, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if payload.is_empty() {
            return Err(BitstreamError::Unsupported(
                "malformed write to the command (CMD) register (missing command code)".into(),
            ));
        }

        let cmd = ConfigCmd::from_code(payload.word(0)?);
        let ctx = self.context_mut()?;
        match cmd {
            ConfigCmd::NUL => ctx.set_write_mode(WriteMode::ReadOnly),
            ConfigCmd::WCFG => ctx.set_write_mode(WriteMode::WriteOnce),
            ConfigCmd::MFW => ctx.set_write_mode(WriteMode::Overwrite),
            // All other commands are decoded for reporting but have no
            // semantics in this model.
            _ => {}
        }

        let args = payload.slice(1, payload.len() - 1)?;
        self.visit(|v, ctx| v.cmd(ctx, cmd, &args))
    }

    fn on_idcode(&mut self, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if payload.is_empty() {
            return Err(BitstreamError::Unsupported(
                "malformed write to the IDCODE register (missing value)".into(),
            ));
        }

        let idcode = payload.word(0)?;
        self.context_mut()?.set_idcode(idcode)?;

        // Known parts contribute their frame geometry, enabling
        // frame-granular write tracking.
        if let Ok(device) = xbit_device::lookup(idcode) {
            self.frame_words = Some(device.frame_words);
        }

        self.visit(|v, ctx| v.idcode(ctx, idcode))
    }

    fn on_far(&mut self, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if payload.is_empty() {
            return Err(BitstreamError::Unsupported(
                "malformed write to the frame address (FAR) register (missing value)".into(),
            ));
        }

        let far = payload.word(0)?;
        self.context_mut()?.set_far(far);
        self.visit(|v, ctx| v.far(ctx, far))
    }

    fn on_fdri(&mut self, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if payload.is_empty() {
            return Ok(true);
        }

        if self.context()?.write_mode() == WriteMode::ReadOnly {
            return Err(BitstreamError::Unsupported(
                "FDRI write in read-only mode (missing WCFG/MFW command)".into(),
            ));
        }

        // Split into frames when the device geometry is known and the
        // payload is frame aligned; otherwise the payload is treated as a
        // single region at the current FAR.
        let frame_len = match self.frame_words {
            Some(fw) if fw > 0 && payload.len() % fw == 0 => fw,
            _ => payload.len(),
        };
        let frame_count = payload.len() / frame_len;

        let base_far = self.context()?.far();
        for i in 0..frame_count {
            let frame_addr = base_far.wrapping_add(i as u32);
            let frame = payload.slice(i * frame_len, frame_len)?;

            let keep = if self.context()?.can_write_frame(frame_addr) {
                self.context_mut()?.mark_frame_written(frame_addr);
                self.visit(|v, ctx| v.frame(ctx, frame_addr, &frame))?
            } else {
                self.visit(|v, ctx| v.frame_skipped(ctx, frame_addr))?
            };
            if !keep {
                return Ok(false);
            }
        }

        self.context_mut()?
            .set_far(base_far.wrapping_add(frame_count as u32));
        self.last_frame = Some(
            payload
                .slice((frame_count - 1) * frame_len, frame_len)?
                .iter()
                .collect(),
        );

        Ok(true)
    }

    fn on_mfwr(&mut self, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        if self.context()?.write_mode() != WriteMode::Overwrite {
            return Err(BitstreamError::Unsupported(
                "MFWR write outside multi-frame write mode (missing MFW command)".into(),
            ));
        }

        if self.last_frame.is_none() {
            return Err(BitstreamError::Unsupported(
                "MFWR write without a preceding FDRI frame".into(),
            ));
        }

        let far = self.context()?.far();
        self.context_mut()?.mark_frame_written(far);
        self.visit(|v, ctx| v.mfwr(ctx, far, payload))
    }

    /// Descends into the encapsulated configuration stream of the next
    /// SLR. The inner stream starts unsynchronized; the outer context is
    /// restored when it completes.
    fn on_next_slr(&mut self, pkt: &Packet, payload: &WordView<'_>) -> Result<bool, BitstreamError> {
        let next_index = self.context()?.slr_index() + 1;

        self.stack.push(ConfigContext::new(next_index));
        let result = self.process_span(payload.as_bytes(), pkt.payload_offset);
        self.stack.pop();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{NOP_WORD, SYNC_WORD};

    fn be(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    fn type1(op: u32, reg: u32, word_count: u32) -> u32 {
        (0b001 << 29) | (op << 27) | (reg << 13) | word_count
    }

    fn type2(op: u32, word_count: u32) -> u32 {
        (0b010 << 29) | (op << 27) | word_count
    }

    fn cmd_write(cmd: ConfigCmd) -> [u32; 2] {
        [type1(0b10, 0x04, 1), cmd.code()]
    }

    /// Records frame writes and SLR activity.
    #[derive(Default, Debug)]
    struct Recorder {
        frames: Vec<(usize, u32, Vec<u32>)>,
        skipped: Vec<u32>,
        idcodes: Vec<(usize, u32)>,
        mfwr: Vec<u32>,
    }

    impl ConfigVisitor for Recorder {
        fn idcode(&mut self, ctx: &ConfigContext, idcode: u32) -> bool {
            self.idcodes.push((ctx.slr_index(), idcode));
            true
        }

        fn frame(&mut self, ctx: &ConfigContext, frame_addr: u32, data: &WordView<'_>) -> bool {
            self.frames
                .push((ctx.slr_index(), frame_addr, data.iter().collect()));
            true
        }

        fn frame_skipped(&mut self, _ctx: &ConfigContext, frame_addr: u32) -> bool {
            self.skipped.push(frame_addr);
            true
        }

        fn mfwr(&mut self, _ctx: &ConfigContext, frame_addr: u32, _args: &WordView<'_>) -> bool {
            self.mfwr.push(frame_addr);
            true
        }
    }

    fn run(words: &[u32]) -> Result<Recorder, BitstreamError> {
        let mut recorder = Recorder::default();
        let bytes = be(words);
        ConfigEngine::new(&mut recorder).process(&bytes)?;
        Ok(recorder)
    }

    #[test]
    fn fdri_in_read_only_mode_fails() {
        let mut words = vec![SYNC_WORD];
        words.extend_from_slice(&cmd_write(ConfigCmd::NUL));
        words.extend_from_slice(&[type1(0b10, 0x02, 2), 0, 0]);
        let err = run(&words).unwrap_err();
        assert!(matches!(err, BitstreamError::Unsupported(_)));
    }

    #[test]
    fn wcfg_enables_frame_writes() {
        let mut words = vec![SYNC_WORD];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 5]);
        words.extend_from_slice(&[type1(0b10, 0x02, 3), 0xA, 0xB, 0xC]);
        let recorder = run(&words).unwrap();
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0].1, 5);
        assert_eq!(recorder.frames[0].2, vec![0xA, 0xB, 0xC]);
    }

    #[test]
    fn write_once_skips_overlapping_frames() {
        // With a known device the payload is split into 101-word frames.
        let frame: Vec<u32> = (0..101).collect();
        let mut words = vec![SYNC_WORD, type1(0b10, 0x0C, 1), 0x0372_2093];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 0]);
        // Two frames at FAR 0,1.
        words.push(type1(0b10, 0x02, 202));
        words.extend_from_slice(&frame);
        words.extend_from_slice(&frame);
        // Overlapping rewrite of FAR 1,2; frame 1 must be retained.
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 1]);
        words.push(type1(0b10, 0x02, 202));
        words.extend_from_slice(&frame);
        words.extend_from_slice(&frame);

        let recorder = run(&words).unwrap();
        let addrs: Vec<u32> = recorder.frames.iter().map(|f| f.1).collect();
        assert_eq!(addrs, vec![0, 1, 2]);
        assert_eq!(recorder.skipped, vec![1]);
    }

    #[test]
    fn far_advances_past_written_frames() {
        let frame: Vec<u32> = vec![0; 101];
        let mut words = vec![SYNC_WORD, type1(0b10, 0x0C, 1), 0x0372_2093];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 10]);
        words.push(type1(0b10, 0x02, 101));
        words.extend_from_slice(&frame);
        // A second FDRI write without FAR update continues at FAR 11.
        words.push(type1(0b10, 0x02, 101));
        words.extend_from_slice(&frame);

        let recorder = run(&words).unwrap();
        let addrs: Vec<u32> = recorder.frames.iter().map(|f| f.1).collect();
        assert_eq!(addrs, vec![10, 11]);
    }

    #[test]
    fn mfwr_requires_mfw_command() {
        let mut words = vec![SYNC_WORD];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x02, 1), 0xAB]);
        words.extend_from_slice(&[type1(0b10, 0x0A, 2), 0, 0]);
        let err = run(&words).unwrap_err();
        assert!(matches!(err, BitstreamError::Unsupported(_)));
    }

    #[test]
    fn mfwr_marks_frames_in_overwrite_mode() {
        let mut words = vec![SYNC_WORD];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 3]);
        words.extend_from_slice(&[type1(0b10, 0x02, 2), 0xAA, 0xBB]);
        words.extend_from_slice(&cmd_write(ConfigCmd::MFW));
        words.extend_from_slice(&[type1(0b10, 0x01, 1), 9]);
        words.extend_from_slice(&[type1(0b10, 0x0A, 2), 0, 0]);
        let recorder = run(&words).unwrap();
        assert_eq!(recorder.mfwr, vec![9]);
    }

    #[test]
    fn type1_type2_fdri_pair() {
        let mut words = vec![SYNC_WORD];
        words.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        words.extend_from_slice(&[type1(0b10, 0x02, 0), type2(0b10, 4), 1, 2, 3, 4]);
        let recorder = run(&words).unwrap();
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0].2, vec![1, 2, 3, 4]);
    }

    #[test]
    fn nested_slr_stream_stacks_contexts() {
        // Inner stream: sync + IDCODE + WCFG + FDRI.
        let mut inner = vec![SYNC_WORD, type1(0b10, 0x0C, 1), 0x04A6_3093];
        inner.extend_from_slice(&cmd_write(ConfigCmd::WCFG));
        inner.extend_from_slice(&[type1(0b10, 0x02, 1), 0x55]);

        let mut words = vec![SYNC_WORD, type1(0b10, 0x0C, 1), 0x0372_2093];
        words.push(type1(0b10, 0x1E, 0));
        words.push(type2(0b10, inner.len() as u32));
        words.extend_from_slice(&inner);

        let recorder = run(&words).unwrap();
        assert_eq!(recorder.idcodes, vec![(0, 0x0372_2093), (1, 0x04A6_3093)]);
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0].0, 1);
    }

    #[test]
    fn outer_context_is_restored_after_inner_stream() {
        // Different IDCODEs per SLR are legal; contexts are isolated, so
        // a repeated outer IDCODE write still matches the outer context.
        let inner = [SYNC_WORD, type1(0b10, 0x0C, 1), 0x04A6_3093];
        let mut words = vec![SYNC_WORD, type1(0b10, 0x0C, 1), 0x0372_2093];
        words.push(type1(0b10, 0x1E, 0));
        words.push(type2(0b10, inner.len() as u32));
        words.extend_from_slice(&inner);
        words.push(type1(0b10, 0x0C, 1));
        words.push(0x0372_2093);

        assert!(run(&words).is_ok());
    }

    #[test]
    fn visitor_can_halt() {
        struct Halter;
        impl ConfigVisitor for Halter {
            fn idcode(&mut self, _ctx: &ConfigContext, _idcode: u32) -> bool {
                false
            }
        }

        let words = [SYNC_WORD, type1(0b10, 0x0C, 1), 0x0372_2093, NOP_WORD];
        let bytes = be(&words);
        let mut halter = Halter;
        let completed = ConfigEngine::new(&mut halter).process(&bytes).unwrap();
        assert!(!completed);
    }

    #[test]
    fn cmd_without_code_fails() {
        let words = [SYNC_WORD, type1(0b10, 0x04, 0), type2(0b10, 0)];
        assert!(matches!(
            run(&words),
            Err(BitstreamError::Unsupported(_))
        ));
    }
}
