// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Yield clocks for cooperative time slicing.
//!
//! The work loop asks a [`YieldClock`] how much of the current slice is left
//! after every unit of work and yields back to the host once the answer drops
//! below [`SchedulerConfig::yield_threshold`](crate::scheduler::SchedulerConfig::yield_threshold).
//! Platform backends wrap their idle primitive (the web backend wraps
//! `IdleDeadline`); the clocks here are deterministic and suit headless hosts
//! and tests:
//!
//! - [`Unbounded`] never asks the loop to yield.
//! - [`UnitBudget`] allows a fixed number of units per slice.
//! - [`SimulatedClock`] advances a fake host time per query against a
//!   deadline, so traces carry plausible timestamps.

use core::cell::Cell;

use crate::time::{Duration, HostTime};

/// Reports the time left in the slice the host granted.
pub trait YieldClock {
    /// Returns the estimated time remaining in the current slice.
    fn time_remaining(&self) -> Duration;

    /// Returns the current host time, used for trace timestamps.
    fn now(&self) -> HostTime {
        HostTime::default()
    }
}

/// A clock with unlimited time: the slice ends only when work runs out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl YieldClock for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// A clock that allows a fixed number of units per slice.
///
/// Each query consumes one unit. Once the budget is spent the clock reports
/// zero time remaining. A slice always processes at least one unit, so a
/// budget of zero behaves like a budget of one.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<u32>,
}

impl UnitBudget {
    /// Creates a budget of `units` units.
    #[must_use]
    pub fn new(units: u32) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Refills the budget for a new slice.
    pub fn refill(&self, units: u32) {
        self.remaining.set(units);
    }

    /// Returns the units left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

impl YieldClock for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 {
            Duration::ZERO
        } else {
            Duration::MAX
        }
    }
}

/// A fake host clock that advances by a fixed step on every query.
///
/// `time_remaining` is measured against a deadline set with
/// [`grant`](Self::grant).
#[derive(Debug)]
pub struct SimulatedClock {
    now: Cell<u64>,
    deadline: Cell<u64>,
    step: u64,
}

impl SimulatedClock {
    /// Creates a clock starting at `start` that advances `step` ticks per
    /// query.
    #[must_use]
    pub fn new(start: HostTime, step: Duration) -> Self {
        Self {
            now: Cell::new(start.ticks()),
            deadline: Cell::new(start.ticks()),
            step: step.ticks(),
        }
    }

    /// Starts a slice of length `slice` at the current time.
    pub fn grant(&self, slice: Duration) {
        self.deadline.set(self.now.get().saturating_add(slice.ticks()));
    }

    /// Moves the clock forward without granting time, e.g. to model the gap
    /// between two idle periods.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by.ticks()));
    }
}

impl YieldClock for SimulatedClock {
    fn time_remaining(&self) -> Duration {
        let now = self.now.get().saturating_add(self.step);
        self.now.set(now);
        Duration(self.deadline.get().saturating_sub(now))
    }

    fn now(&self) -> HostTime {
        HostTime(self.now.get())
    }
}
