// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Fiber effect batches ([`on_fiber_effects`](TraceSink::on_fiber_effects))
//! store only per-tag counts.

use weft_core::fiber::EffectTag;
use weft_core::time::{Duration, HostTime};
use weft_core::trace::{
    CycleCause, CycleScheduledEvent, CycleSummary, FiberEffect, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, SliceEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CYCLE_SCHEDULED: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_SLICE: u8 = 4;
const TAG_CYCLE_SUMMARY: u8 = 5;
const TAG_FIBER_EFFECTS: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_cause(&mut self, c: CycleCause) {
        self.write_u8(match c {
            CycleCause::Render => 0,
            CycleCause::StateUpdate => 1,
        });
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Render => 0,
            PhaseKind::Commit => 1,
        });
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "effect count capped at u32::MAX for recording"
    )]
    fn write_count(&mut self, effects: &[FiberEffect], tag: EffectTag) {
        let count = effects.iter().filter(|e| e.effect == tag).count();
        self.write_u32(count.min(u32::MAX as usize) as u32);
    }
}

impl TraceSink for RecorderSink {
    fn on_cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
        self.write_u8(TAG_CYCLE_SCHEDULED);
        self.write_u64(e.cycle);
        self.write_cause(e.cause);
        self.write_option_u64(e.superseded);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        self.write_u8(TAG_SLICE);
        self.write_u64(e.cycle);
        self.write_u32(e.units);
        self.write_u64(e.remaining.ticks());
        self.write_u8(u8::from(e.yielded));
        self.write_u64(e.timestamp.ticks());
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.write_u8(TAG_CYCLE_SUMMARY);
        self.write_u64(s.cycle);
        self.write_cause(s.cause);
        self.write_u32(s.units);
        self.write_u32(s.slices);
        self.write_u32(s.placements);
        self.write_u32(s.updates);
        self.write_u32(s.deletions);
        self.write_u32(s.property_mutations);
        self.write_u64(s.render_ticks);
        self.write_u64(s.commit_ticks);
    }

    fn on_fiber_effects(&mut self, cycle: u64, effects: &[FiberEffect]) {
        self.write_u8(TAG_FIBER_EFFECTS);
        self.write_u64(cycle);
        self.write_count(effects, EffectTag::Placement);
        self.write_count(effects, EffectTag::Update);
        self.write_count(effects, EffectTag::Deletion);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CycleScheduledEvent`].
    CycleScheduled(CycleScheduledEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`SliceEvent`].
    Slice(SliceEvent),
    /// A [`CycleSummary`].
    CycleSummary(CycleSummary),
    /// Per-tag effect counts for a committed cycle.
    FiberEffects {
        /// Cycle counter.
        cycle: u64,
        /// Fibers tagged for placement.
        placements: u32,
        /// Fibers tagged for update.
        updates: u32,
        /// Fibers tagged for deletion.
        deletions: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_cause(&mut self) -> Option<CycleCause> {
        Some(match self.read_u8()? {
            0 => CycleCause::Render,
            _ => CycleCause::StateUpdate,
        })
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Render,
            _ => PhaseKind::Commit,
        })
    }

    fn decode_cycle_scheduled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleScheduled(CycleScheduledEvent {
            cycle: self.read_u64()?,
            cause: self.read_cause()?,
            superseded: self.read_option_u64()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_slice(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Slice(SliceEvent {
            cycle: self.read_u64()?,
            units: self.read_u32()?,
            remaining: Duration(self.read_u64()?),
            yielded: self.read_u8()? != 0,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_cycle_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleSummary(CycleSummary {
            cycle: self.read_u64()?,
            cause: self.read_cause()?,
            units: self.read_u32()?,
            slices: self.read_u32()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
            property_mutations: self.read_u32()?,
            render_ticks: self.read_u64()?,
            commit_ticks: self.read_u64()?,
        }))
    }

    fn decode_fiber_effects(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FiberEffects {
            cycle: self.read_u64()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CYCLE_SCHEDULED => self.decode_cycle_scheduled(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_SLICE => self.decode_slice(),
            TAG_CYCLE_SUMMARY => self.decode_cycle_summary(),
            TAG_FIBER_EFFECTS => self.decode_fiber_effects(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
