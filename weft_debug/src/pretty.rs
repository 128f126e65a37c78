// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use weft_core::fiber::EffectTag;
use weft_core::time::{Duration, HostTime, Timebase};
use weft_core::trace::{
    CycleCause, CycleScheduledEvent, CycleSummary, FiberEffect, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, SliceEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }

    fn remaining(&self, d: Duration) -> String {
        if d == Duration::MAX {
            "unbounded".into()
        } else {
            format!("{:.1}µs", self.ticks_to_us(d.ticks()))
        }
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Render => "render",
        PhaseKind::Commit => "commit",
    }
}

fn cause_name(cause: CycleCause) -> &'static str {
    match cause {
        CycleCause::Render => "render",
        CycleCause::StateUpdate => "state",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
        let superseded = match e.superseded {
            Some(cycle) => format!(" supersedes={cycle}"),
            None => String::new(),
        };
        let _ = writeln!(
            self.writer,
            "[cycle] cycle={} cause={} at {:.1}µs{superseded}",
            e.cycle,
            cause_name(e.cause),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        let state = if e.yielded { "yield" } else { "done" };
        let _ = writeln!(
            self.writer,
            "[slice] cycle={} units={} remaining={} {state}",
            e.cycle,
            e.units,
            self.remaining(e.remaining),
        );
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] cycle={} cause={} units={} slices={} \
             placed={} updated={} deleted={} props={} \
             render={:.1}µs commit={:.1}µs",
            s.cycle,
            cause_name(s.cause),
            s.units,
            s.slices,
            s.placements,
            s.updates,
            s.deletions,
            s.property_mutations,
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.commit_ticks),
        );
    }

    fn on_fiber_effects(&mut self, cycle: u64, effects: &[FiberEffect]) {
        let count = |tag: EffectTag| effects.iter().filter(|e| e.effect == tag).count();
        let _ = writeln!(
            self.writer,
            "[effects] cycle={cycle} placement={} update={} deletion={}",
            count(EffectTag::Placement),
            count(EffectTag::Update),
            count(EffectTag::Deletion),
        );
    }
}
