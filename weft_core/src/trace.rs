// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for render cycles.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scheduler calls as a render cycle is scheduled, worked on slice by slice,
//! and committed. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`CycleSummaryBuilder`] accumulates phase durations across the slices of a
//! cycle and produces a [`CycleSummary`] at commit.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`FiberEffect`] batches and the
//!   corresponding `TraceSink` method.

use crate::commit::CommitStats;
#[cfg(feature = "trace-rich")]
use crate::fiber::EffectTag;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a render cycle is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Interruptible tree walk: component evaluation and reconciliation.
    Render,
    /// Atomic application of effects to the host tree.
    Commit,
}

/// What scheduled a render cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleCause {
    /// An explicit `render` call.
    Render,
    /// A state setter.
    StateUpdate,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a new render cycle starts from the root.
#[derive(Clone, Copy, Debug)]
pub struct CycleScheduledEvent {
    /// Monotonic cycle counter.
    pub cycle: u64,
    /// What scheduled the cycle.
    pub cause: CycleCause,
    /// The unfinished cycle this one discards, if any.
    pub superseded: Option<u64>,
    /// Host time when the cycle was scheduled.
    pub timestamp: HostTime,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted at the end of every slice that did render work.
#[derive(Clone, Copy, Debug)]
pub struct SliceEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Units processed in this slice.
    pub units: u32,
    /// Time the clock reported as remaining when the slice stopped.
    pub remaining: Duration,
    /// Whether the walk still has units left.
    pub yielded: bool,
    /// Host time at the end of the slice.
    pub timestamp: HostTime,
}

/// Per-cycle summary produced by [`CycleSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct CycleSummary {
    /// Cycle counter.
    pub cycle: u64,
    /// What scheduled the cycle.
    pub cause: CycleCause,
    /// Total units of work processed.
    pub units: u32,
    /// Number of slices the walk spanned.
    pub slices: u32,
    /// Fibers attached by the commit.
    pub placements: u32,
    /// Fibers whose host node was diffed.
    pub updates: u32,
    /// Fibers removed by the commit.
    pub deletions: u32,
    /// Property and listener calls issued during commit.
    pub property_mutations: u32,
    /// Render phase duration summed over slices, in ticks.
    pub render_ticks: u64,
    /// Commit phase duration in ticks.
    pub commit_ticks: u64,
}

/// One fiber's effect in a committed cycle.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct FiberEffect {
    /// Slot index of the fiber.
    pub fiber_index: u32,
    /// The effect applied.
    pub effect: EffectTag,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a cycle is scheduled.
    fn on_cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called at the end of a slice.
    fn on_slice(&mut self, e: &SliceEvent) {
        _ = e;
    }

    /// Called with the summary of a committed cycle.
    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        _ = s;
    }

    /// Called with the effects of a committed cycle, in commit order
    /// (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_fiber_effects(&mut self, cycle: u64, effects: &[FiberEffect]) {
        _ = (cycle, effects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`CycleScheduledEvent`].
    #[inline]
    pub fn cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle_scheduled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SliceEvent`].
    #[inline]
    pub fn slice(&mut self, e: &SliceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slice(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleSummary`].
    #[inline]
    pub fn cycle_summary(&mut self, s: &CycleSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_cycle_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits fiber effects (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn fiber_effects(&mut self, cycle: u64, effects: &[FiberEffect]) {
        if let Some(s) = &mut self.sink {
            s.on_fiber_effects(cycle, effects);
        }
    }

    /// Returns whether rich events would reach a sink.
    #[cfg(feature = "trace-rich")]
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }
}

// ---------------------------------------------------------------------------
// CycleSummaryBuilder
// ---------------------------------------------------------------------------

/// Accumulates per-cycle counters and phase durations across slices.
#[derive(Clone, Debug)]
pub struct CycleSummaryBuilder {
    cycle: u64,
    cause: CycleCause,
    units: u32,
    slices: u32,
    phase_starts: [Option<HostTime>; 2],
    phase_ticks: [u64; 2],
}

impl CycleSummaryBuilder {
    /// Starts a summary for a newly scheduled cycle.
    #[must_use]
    pub fn new(cycle: u64, cause: CycleCause) -> Self {
        Self {
            cycle,
            cause,
            units: 0,
            slices: 0,
            phase_starts: [None; 2],
            phase_ticks: [0; 2],
        }
    }

    /// Returns the cycle this builder belongs to.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Records the units processed by one slice.
    pub fn record_slice(&mut self, units: u32) {
        self.units = self.units.saturating_add(units);
        self.slices = self.slices.saturating_add(1);
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase. Repeated begin/end pairs accumulate.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        let idx = phase_index(phase);
        if let Some(start) = self.phase_starts[idx].take() {
            self.phase_ticks[idx] += t.saturating_duration_since(start).ticks();
        }
    }

    /// Consumes the builder and produces the final [`CycleSummary`].
    #[must_use]
    pub fn finish(self, stats: &CommitStats) -> CycleSummary {
        CycleSummary {
            cycle: self.cycle,
            cause: self.cause,
            units: self.units,
            slices: self.slices,
            placements: stats.placements,
            updates: stats.updates,
            deletions: stats.deletions,
            property_mutations: stats.property_mutations,
            render_ticks: self.phase_ticks[phase_index(PhaseKind::Render)],
            commit_ticks: self.phase_ticks[phase_index(PhaseKind::Commit)],
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Render => 0,
        PhaseKind::Commit => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
