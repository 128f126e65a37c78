// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless counter app that exercises the tracing and diagnostics pipeline.
//!
//! Mounts a counter above a long list into a [`MemoryHost`], then feeds the
//! scheduler simulated idle periods. Between periods the counter is clicked,
//! so some cycles are restarted mid-walk. Events go to both a
//! [`PrettyPrintSink`](weft_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](weft_debug::recorder::RecorderSink), and the recording is
//! exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use weft_core::clock::SimulatedClock;
use weft_core::element::{Child, Element, build};
use weft_core::hooks::Hooks;
use weft_core::host::memory::{MemoryHost, NodeId};
use weft_core::props::{Listener, Props};
use weft_core::scheduler::{Scheduler, SchedulerConfig};
use weft_core::time::{Duration, HostTime, Timebase};
use weft_core::trace::{
    CycleScheduledEvent, CycleSummary, FiberEffect, PhaseBeginEvent, PhaseEndEvent, SliceEvent,
    TraceSink, Tracer,
};

use weft_debug::pretty::PrettyPrintSink;
use weft_debug::recorder::RecorderSink;

const ITEMS: u32 = 40;
const IDLE_PERIODS: u32 = 40;
/// Length of each idle period, in µs.
const IDLE_PERIOD: Duration = Duration(4_000);
/// Simulated cost of one unit of work, in µs.
const UNIT_COST: Duration = Duration(150);
/// Busy time between idle periods, in µs.
const BUSY_GAP: Duration = Duration(12_000);
/// Idle periods after which the counter is clicked.
const CLICKS_AT: [u32; 3] = [3, 4, 20];

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
        self.pretty.on_cycle_scheduled(e);
        self.recorder.on_cycle_scheduled(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        self.pretty.on_slice(e);
        self.recorder.on_slice(e);
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.pretty.on_cycle_summary(s);
        self.recorder.on_cycle_summary(s);
    }

    fn on_fiber_effects(&mut self, cycle: u64, effects: &[FiberEffect]) {
        self.pretty.on_fiber_effects(cycle, effects);
        self.recorder.on_fiber_effects(cycle, effects);
    }
}

fn counter(hooks: &mut Hooks<'_>, _: &Props) -> Element {
    let (count, set_count) = hooks.use_state(1_u32);
    build(
        "h1",
        Props::new().on("click", Listener::new(move || set_count.set(|c| c + 1))),
        [Child::from(format!("Count: {count}"))],
    )
}

fn app() -> Element {
    let list = build(
        "ul",
        Props::new(),
        (0..ITEMS).map(|i| {
            Child::from(build(
                "li",
                Props::new().attr("class", if i % 2 == 0 { "even" } else { "odd" }),
                [Child::from(format!("item {i}"))],
            ))
        }),
    );
    build(
        "main",
        Props::new().attr("id", "app"),
        [
            Child::from(Element::component(counter, Props::new())),
            Child::from(list),
        ],
    )
}

fn click(scheduler: &Scheduler<MemoryHost>, container: NodeId) {
    if let Some(h1) = scheduler.host().find(container, "h1") {
        scheduler.host().dispatch(h1, "click");
    }
}

fn main() {
    let timebase = Timebase::MICROS;

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), timebase);
    let mut recorder = RecorderSink::new();

    // -- scheduler ---------------------------------------------------------
    let mut host = MemoryHost::new();
    let container = host.create_container();
    let mut scheduler = Scheduler::new(host, SchedulerConfig::web());
    scheduler
        .render(app(), container)
        .expect("memory container is always valid");

    // -- simulated idle loop -----------------------------------------------
    let clock = SimulatedClock::new(HostTime(1_000_000), UNIT_COST);
    let mut commits = 0_u32;

    for period in 0..IDLE_PERIODS {
        if CLICKS_AT.contains(&period) {
            click(&scheduler, container);
        }
        if scheduler.has_pending_work() {
            clock.grant(IDLE_PERIOD);
            let mut tee = Tee {
                pretty: &mut pretty,
                recorder: &mut recorder,
            };
            let outcome = scheduler.run_slice_traced(&clock, &mut Tracer::new(&mut tee));
            if outcome.committed.is_some() {
                commits += 1;
            }
        }
        clock.advance(BUSY_GAP);
    }

    let heading = scheduler
        .host()
        .find(container, "h1")
        .map(|h1| scheduler.host().text_content(h1))
        .unwrap_or_default();
    println!(
        "{heading} ({} cycles, {commits} commits)",
        scheduler.cycle()
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    weft_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}
