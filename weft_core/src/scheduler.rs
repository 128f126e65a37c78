// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative, interruptible render scheduling.
//!
//! The [`Scheduler`] owns the fiber trees of one render root and the host they
//! are committed to. Work proceeds in *slices*: the host grants some idle time
//! through a [`YieldClock`] and calls [`Scheduler::run_slice`], which processes
//! fibers one unit at a time in depth-first pre-order until the clock runs low
//! or the walk ends. The walk can stop between any two units and resumes from
//! the same fiber in the next slice. When the last unit is done the finished
//! tree is committed in the same slice.
//!
//! # Cycle lifecycle
//!
//! ```text
//!   render() / setter ──► schedule ──► IN PROGRESS ──► walk done ──► commit ──► IDLE
//!                              ▲             │
//!                              └─ new request discards the unfinished tree
//! ```
//!
//! Every cycle starts from the root: a state update re-walks the whole tree and
//! reconciliation decides what actually changed.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::clock::{Unbounded, YieldClock};
use crate::commit::{CommitStats, commit_root};
use crate::element::{Component, Element};
use crate::fiber::{EffectTag, FiberId, FiberKind, FiberStore, NewFiber};
use crate::hooks::{HookSlot, Hooks, UpdateSignal};
use crate::host::HostRenderer;
use crate::props::{Props, PropsPatch};
use crate::reconcile::reconcile_children;
use crate::time::Duration;
#[cfg(feature = "trace-rich")]
use crate::trace::FiberEffect;
use crate::trace::{
    CycleCause, CycleScheduledEvent, CycleSummaryBuilder, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, SliceEvent, Tracer,
};

/// Configuration for the [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// A slice ends once the clock reports less than this much time left.
    pub yield_threshold: Duration,
    /// Optional hard cap on units per slice, independent of the clock.
    pub max_units_per_slice: Option<u32>,
}

impl SchedulerConfig {
    /// Default configuration for browser idle callbacks: yield with less than
    /// 1 ms left, at microsecond ticks.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            yield_threshold: Duration(1_000),
            max_units_per_slice: None,
        }
    }

    /// Configuration for headless hosts: yield only once the clock is
    /// exhausted.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            yield_threshold: Duration(1),
            max_units_per_slice: None,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::headless()
    }
}

/// Why a render request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The host does not accept the node as a render container.
    InvalidContainer,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContainer => f.write_str("render container is not a valid host container"),
        }
    }
}

impl core::error::Error for RenderError {}

/// Where the scheduler is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    /// No work-in-progress tree.
    Idle,
    /// A tree is being built; more units remain.
    InProgress,
    /// The walk is done and the tree commits at the end of the next slice.
    Complete,
}

/// What one slice did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceOutcome {
    /// Units processed.
    pub units: u32,
    /// Commit counts, if the slice committed a tree.
    pub committed: Option<CommitStats>,
    /// Whether the host must grant another slice.
    pub pending: bool,
}

#[derive(Clone, Debug)]
struct RootRequest<N> {
    element: Element,
    container: N,
}

/// Drives render cycles for one root.
pub struct Scheduler<R: HostRenderer> {
    host: R,
    config: SchedulerConfig,
    fibers: FiberStore<R::Node>,
    committed: Option<RootRequest<R::Node>>,
    wip_request: Option<RootRequest<R::Node>>,
    current_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    signal: UpdateSignal,
    cycle: u64,
    summary: Option<CycleSummaryBuilder>,
    announcement: Option<(CycleCause, Option<u64>)>,
}

impl<R: HostRenderer> fmt::Debug for Scheduler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("cycle", &self.cycle)
            .field("current_root", &self.current_root)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .field("deletions", &self.deletions)
            .finish_non_exhaustive()
    }
}

impl<R: HostRenderer> Scheduler<R> {
    /// Creates a scheduler that commits to `host`.
    #[must_use]
    pub fn new(host: R, config: SchedulerConfig) -> Self {
        Self {
            host,
            config,
            fibers: FiberStore::new(),
            committed: None,
            wip_request: None,
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            signal: UpdateSignal::default(),
            cycle: 0,
            summary: None,
            announcement: None,
        }
    }

    // -- Entry points --

    /// Schedules a render of `element` into `container`.
    ///
    /// Any unfinished cycle is discarded. Rendering into the container of the
    /// committed tree diffs against it; rendering into another container
    /// removes the committed tree from its old container at the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidContainer`] if the host rejects
    /// `container`.
    pub fn render(&mut self, element: Element, container: R::Node) -> Result<(), RenderError> {
        if !self.host.is_container(&container) {
            return Err(RenderError::InvalidContainer);
        }
        self.schedule(CycleCause::Render, Some(RootRequest { element, container }));
        Ok(())
    }

    /// Runs one slice against `clock`.
    pub fn run_slice(&mut self, clock: &dyn YieldClock) -> SliceOutcome {
        self.run_slice_traced(clock, &mut Tracer::none())
    }

    /// Runs one slice against `clock`, reporting to `tracer`.
    pub fn run_slice_traced(
        &mut self,
        clock: &dyn YieldClock,
        tracer: &mut Tracer<'_>,
    ) -> SliceOutcome {
        if self.signal.take() {
            self.schedule(CycleCause::StateUpdate, None);
        }
        self.announce(clock, tracer);

        let mut outcome = SliceOutcome::default();
        let mut segment_units = 0_u32;
        let mut segment_open = false;
        let mut remaining = Duration::MAX;

        while let Some(unit) = self.next_unit {
            if !segment_open {
                self.begin_segment(clock, tracer);
                segment_open = true;
                segment_units = 0;
            }

            self.next_unit = self.perform_unit(unit);
            segment_units += 1;
            outcome.units += 1;

            remaining = clock.time_remaining();
            let should_yield = remaining < self.config.yield_threshold
                || self
                    .config
                    .max_units_per_slice
                    .is_some_and(|cap| outcome.units >= cap);

            if self.signal.take() {
                self.end_segment(clock, tracer, segment_units, remaining);
                segment_open = false;
                self.schedule(CycleCause::StateUpdate, None);
                self.announce(clock, tracer);
            }

            if should_yield {
                break;
            }
        }

        if segment_open {
            self.end_segment(clock, tracer, segment_units, remaining);
        }

        if self.next_unit.is_none() && self.wip_root.is_some() {
            outcome.committed = Some(self.commit(clock, tracer));
        }

        outcome.pending = self.has_pending_work();
        outcome
    }

    /// Runs slices with an unbounded clock until no work is pending, and
    /// returns the number of commits.
    ///
    /// A component that calls a setter on every render never settles; this
    /// does not return for such a tree.
    pub fn flush(&mut self) -> u32 {
        let mut commits = 0;
        loop {
            let outcome = self.run_slice(&Unbounded);
            if outcome.committed.is_some() {
                commits += 1;
            }
            if !outcome.pending {
                return commits;
            }
        }
    }

    // -- Introspection --

    /// Returns whether the host must keep granting slices.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || (self.committed.is_some() && self.signal.is_raised())
    }

    /// Returns the cycle state.
    #[must_use]
    pub fn state(&self) -> CycleState {
        match (self.wip_root, self.next_unit) {
            (None, _) => CycleState::Idle,
            (Some(_), Some(_)) => CycleState::InProgress,
            (Some(_), None) => CycleState::Complete,
        }
    }

    /// Returns the root of the last committed tree.
    #[must_use]
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Returns the root of the tree being built.
    #[must_use]
    pub fn work_in_progress_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Returns the next fiber the walk will process.
    #[must_use]
    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    /// Returns the fibers queued for removal by the next commit.
    #[must_use]
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Returns the number of cycles scheduled so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns the fiber store.
    #[must_use]
    pub fn fibers(&self) -> &FiberStore<R::Node> {
        &self.fibers
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &R {
        &self.host
    }

    /// Returns the host mutably. Changes made here bypass reconciliation.
    pub fn host_mut(&mut self) -> &mut R {
        &mut self.host
    }

    // -- Cycle management --

    /// Starts a new cycle, discarding unfinished work.
    ///
    /// Without a new `request` the cycle re-renders the committed tree's
    /// description, or the unfinished one if nothing has been committed yet.
    fn schedule(&mut self, cause: CycleCause, request: Option<RootRequest<R::Node>>) {
        let Some(request) = request
            .or_else(|| self.committed.clone())
            .or_else(|| self.wip_request.clone())
        else {
            return;
        };
        // Queued updates are replayed by the new walk.
        self.signal.take();

        let superseded = self.wip_root.take().map(|wip| {
            self.fibers.free_tree(wip);
            self.cycle
        });
        self.deletions.clear();

        let alternate = match self.current_root {
            Some(current) if self.fibers.node(current) == Some(&request.container) => Some(current),
            Some(current) => {
                let old_children: Vec<FiberId> = self.fibers.children(current).collect();
                for &child in &old_children {
                    self.fibers.set_effect(child, EffectTag::Deletion);
                }
                self.deletions = old_children;
                None
            }
            None => None,
        };

        let mut props = Props::new();
        props.set_children(vec![request.element.clone()]);
        let wip = self.fibers.create(NewFiber {
            kind: FiberKind::Root,
            props,
            node: Some(request.container.clone()),
            parent: None,
            alternate,
            effect: None,
        });

        self.wip_root = Some(wip);
        self.next_unit = Some(wip);
        self.wip_request = Some(request);
        self.cycle += 1;
        self.summary = Some(CycleSummaryBuilder::new(self.cycle, cause));
        self.announcement = Some((cause, superseded));
    }

    fn announce(&mut self, clock: &dyn YieldClock, tracer: &mut Tracer<'_>) {
        if let Some((cause, superseded)) = self.announcement.take() {
            tracer.cycle_scheduled(&CycleScheduledEvent {
                cycle: self.cycle,
                cause,
                superseded,
                timestamp: clock.now(),
            });
        }
    }

    fn begin_segment(&mut self, clock: &dyn YieldClock, tracer: &mut Tracer<'_>) {
        let timestamp = clock.now();
        tracer.phase_begin(&PhaseBeginEvent {
            cycle: self.cycle,
            phase: PhaseKind::Render,
            timestamp,
        });
        if let Some(summary) = &mut self.summary {
            summary.phase_begin(PhaseKind::Render, timestamp);
        }
    }

    fn end_segment(
        &mut self,
        clock: &dyn YieldClock,
        tracer: &mut Tracer<'_>,
        units: u32,
        remaining: Duration,
    ) {
        let timestamp = clock.now();
        tracer.phase_end(&PhaseEndEvent {
            cycle: self.cycle,
            phase: PhaseKind::Render,
            timestamp,
        });
        tracer.slice(&SliceEvent {
            cycle: self.cycle,
            units,
            remaining,
            yielded: self.next_unit.is_some(),
            timestamp,
        });
        if let Some(summary) = &mut self.summary {
            summary.phase_end(PhaseKind::Render, timestamp);
            summary.record_slice(units);
        }
    }

    // -- Units of work --

    /// Processes one fiber and returns the next one in pre-order.
    fn perform_unit(&mut self, fiber: FiberId) -> Option<FiberId> {
        let children = match self.fibers.kind(fiber) {
            FiberKind::Component(component) => {
                let component = component.clone();
                vec![self.evaluate_component(fiber, &component)]
            }
            _ => self.process_host(fiber),
        };
        reconcile_children(&mut self.fibers, &mut self.deletions, fiber, children);
        let root = self.wip_root?;
        self.fibers.next_unit(root, fiber)
    }

    /// Runs a component's render function with its hook context.
    fn evaluate_component(&mut self, fiber: FiberId, component: &Component) -> Element {
        let previous: Option<Vec<HookSlot>> = self
            .fibers
            .alternate(fiber)
            .map(|alternate| self.fibers.hooks(alternate).to_vec());
        let mut hooks = Hooks::new(previous.as_deref(), &self.signal);
        let child = component.render(&mut hooks, self.fibers.props(fiber));
        let slots = hooks.finish();
        self.fibers.set_hooks(fiber, slots);
        child
    }

    /// Creates the host node on first visit and hands over the children.
    fn process_host(&mut self, fiber: FiberId) -> Vec<Element> {
        if self.fibers.node(fiber).is_none() {
            let node = match self.fibers.kind(fiber) {
                FiberKind::Host(kind) => self.host.create_node(kind),
                FiberKind::Text => self.host.create_text_node(),
                kind => panic!("{kind:?} fiber {fiber:?} cannot create a host node"),
            };
            PropsPatch::initial(self.fibers.props(fiber)).apply(&mut self.host, &node);
            self.fibers.set_node(fiber, node);
        }
        self.fibers.take_children(fiber)
    }

    // -- Commit --

    fn commit(&mut self, clock: &dyn YieldClock, tracer: &mut Tracer<'_>) -> CommitStats {
        let Some(root) = self.wip_root else {
            return CommitStats::default();
        };

        let begin = clock.now();
        tracer.phase_begin(&PhaseBeginEvent {
            cycle: self.cycle,
            phase: PhaseKind::Commit,
            timestamp: begin,
        });
        if let Some(summary) = &mut self.summary {
            summary.phase_begin(PhaseKind::Commit, begin);
        }

        #[cfg(feature = "trace-rich")]
        if tracer.is_enabled() {
            let effects = self.collect_effects(root);
            tracer.fiber_effects(self.cycle, &effects);
        }

        let stats = commit_root(&mut self.host, &self.fibers, root, &self.deletions);

        if let Some(previous) = self.current_root.replace(root) {
            self.fibers.free_tree(previous);
        }
        self.fibers.clear_alternates(root);
        self.committed = self.wip_request.take();
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();

        let end = clock.now();
        tracer.phase_end(&PhaseEndEvent {
            cycle: self.cycle,
            phase: PhaseKind::Commit,
            timestamp: end,
        });
        if let Some(mut summary) = self.summary.take() {
            summary.phase_end(PhaseKind::Commit, end);
            tracer.cycle_summary(&summary.finish(&stats));
        }

        stats
    }

    #[cfg(feature = "trace-rich")]
    fn collect_effects(&self, root: FiberId) -> Vec<FiberEffect> {
        let deleted = self.deletions.iter().map(|&fiber| FiberEffect {
            fiber_index: fiber.index(),
            effect: EffectTag::Deletion,
        });
        let tree = self
            .fibers
            .descendants(root)
            .filter_map(|fiber| {
                self.fibers.effect(fiber).map(|effect| FiberEffect {
                    fiber_index: fiber.index(),
                    effect,
                })
            });
        deleted.chain(tree).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::UnitBudget;
    use crate::host::memory::{MemoryHost, NodeId};

    fn scheduler() -> (Scheduler<MemoryHost>, NodeId) {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        (Scheduler::new(host, SchedulerConfig::headless()), container)
    }

    fn list(n: usize) -> Element {
        let mut ul = Element::host("ul");
        for i in 0..n {
            ul = ul.child(Element::host("li").child(u32::try_from(i).unwrap()));
        }
        ul
    }

    #[test]
    fn render_sets_cursor_to_new_root() {
        let (mut s, container) = scheduler();
        assert_eq!(s.state(), CycleState::Idle);
        s.render(list(1), container).unwrap();
        assert_eq!(s.state(), CycleState::InProgress);
        assert_eq!(s.next_unit(), s.work_in_progress_root());
        assert_eq!(s.cycle(), 1);
        assert!(s.has_pending_work());
    }

    #[test]
    fn budget_splits_the_walk_across_slices() {
        let (mut s, container) = scheduler();
        // root, ul, 3 x (li, text) = 8 units
        s.render(list(3), container).unwrap();
        let budget = UnitBudget::new(3);

        let first = s.run_slice(&budget);
        assert_eq!(first.units, 3);
        assert!(first.committed.is_none());
        assert!(first.pending);
        assert!(s.host().children(container).is_empty(), "nothing attached before commit");

        budget.refill(3);
        assert_eq!(s.run_slice(&budget).units, 3);
        budget.refill(3);
        let last = s.run_slice(&budget);
        assert_eq!(last.units, 2);
        assert!(last.committed.is_some());
        assert!(!last.pending);
        assert_eq!(
            s.host().inner_markup(container),
            "<ul><li>0</li><li>1</li><li>2</li></ul>"
        );
    }

    #[test]
    fn unit_cap_limits_slices() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let config = SchedulerConfig {
            max_units_per_slice: Some(2),
            ..SchedulerConfig::headless()
        };
        let mut s = Scheduler::new(host, config);
        s.render(list(1), container).unwrap();
        // root, ul, li, text
        let first = s.run_slice(&Unbounded);
        assert_eq!(first.units, 2);
        assert!(first.committed.is_none());
        let second = s.run_slice(&Unbounded);
        assert_eq!(second.units, 2);
        assert!(second.committed.is_some());
    }

    #[test]
    fn web_config_yields_under_one_millisecond() {
        let config = SchedulerConfig::web();
        assert_eq!(config.yield_threshold, Duration(1_000));
        assert!(config.max_units_per_slice.is_none());
        assert_eq!(SchedulerConfig::default(), SchedulerConfig::headless());
    }

    #[test]
    fn commit_promotes_and_clears() {
        let (mut s, container) = scheduler();
        s.render(list(2), container).unwrap();
        let wip = s.work_in_progress_root();
        assert_eq!(s.flush(), 1);
        assert_eq!(s.current_root(), wip);
        assert_eq!(s.work_in_progress_root(), None);
        assert_eq!(s.next_unit(), None);
        assert!(s.pending_deletions().is_empty());
        assert_eq!(s.state(), CycleState::Idle);
    }

    #[test]
    fn invalid_container_is_rejected() {
        let (mut s, _) = scheduler();
        let text = s.host_mut().create_text_node();
        assert_eq!(s.render(list(1), text), Err(RenderError::InvalidContainer));
        assert_eq!(s.cycle(), 0);
        assert!(!s.has_pending_work());
    }

    #[test]
    fn idle_slice_does_nothing() {
        let (mut s, _) = scheduler();
        assert_eq!(s.run_slice(&Unbounded), SliceOutcome::default());
    }

    #[test]
    fn superseded_tree_is_freed() {
        let (mut s, container) = scheduler();
        s.render(list(3), container).unwrap();
        s.run_slice(&UnitBudget::new(4));
        let live_mid_walk = s.fibers().live_count();
        assert!(live_mid_walk > 1);

        s.render(list(1), container).unwrap();
        assert_eq!(s.fibers().live_count(), 1, "only the new root survives");
        s.flush();
        assert_eq!(s.host().inner_markup(container), "<ul><li>0</li></ul>");
    }

    #[test]
    fn error_displays() {
        use alloc::string::ToString;
        assert_eq!(
            RenderError::InvalidContainer.to_string(),
            "render container is not a valid host container"
        );
    }
}
