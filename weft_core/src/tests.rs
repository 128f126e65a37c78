// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end rendering against [`MemoryHost`].

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::clock::{Unbounded, UnitBudget};
use crate::element::{Child, Element, RenderPtr, build};
use crate::fiber::FiberKind;
use crate::hooks::Hooks;
use crate::host::HostRenderer;
use crate::host::memory::{HostOp, MemoryHost, NodeId};
use crate::props::{Listener, NODE_VALUE, Props, Value};
use crate::scheduler::{RenderError, Scheduler, SchedulerConfig};

fn setup() -> (Scheduler<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    (Scheduler::new(host, SchedulerConfig::headless()), container)
}

fn counter(hooks: &mut Hooks<'_>, _: &Props) -> Element {
    let (count, set_count) = hooks.use_state(1_i64);
    build(
        "h1",
        Props::new().on("click", Listener::new(move || set_count.set(|c| c + 1))),
        [Child::from(format!("Count: {count}"))],
    )
}

fn items(labels: &[&'static str]) -> Element {
    build(
        "ul",
        Props::new(),
        labels
            .iter()
            .map(|&label| Child::from(build("li", Props::new(), [Child::from(label)]))),
    )
}

fn click(scheduler: &Scheduler<MemoryHost>, container: NodeId) {
    let h1 = scheduler.host().find(container, "h1").unwrap();
    assert_eq!(scheduler.host().dispatch(h1, "click"), 1);
}

#[test]
fn counter_renders_and_counts_clicks() {
    let (mut s, container) = setup();
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    assert_eq!(s.flush(), 1);
    assert_eq!(s.host().inner_markup(container), "<h1>Count: 1</h1>");

    click(&s, container);
    click(&s, container);
    click(&s, container);
    assert!(s.has_pending_work());
    assert_eq!(s.flush(), 1, "queued clicks settle in one cycle");
    assert_eq!(s.host().inner_markup(container), "<h1>Count: 4</h1>");
}

#[test]
fn state_update_touches_only_the_changed_text() {
    let (mut s, container) = setup();
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    s.flush();
    let h1 = s.host().find(container, "h1").unwrap();
    let text = s.host().children(h1)[0];
    let nodes_before = s.host().node_count();

    click(&s, container);
    s.host_mut().take_ops();
    s.flush();

    let ops = s.host_mut().take_ops();
    assert_eq!(s.host().node_count(), nodes_before);
    assert!(ops.iter().all(|op| !op.is_create() && !op.is_structural()));
    let property_sets: Vec<_> = ops
        .iter()
        .filter(|op| matches!(op, HostOp::SetProperty { .. }))
        .collect();
    assert_eq!(
        property_sets,
        [&HostOp::SetProperty {
            node: text,
            name: NODE_VALUE.into(),
            value: Value::from("Count: 2"),
        }]
    );
    assert_eq!(s.host().text_content(h1), "Count: 2");
}

#[test]
fn replaced_listener_is_swapped_on_the_same_node() {
    let (mut s, container) = setup();
    let a_calls = Rc::new(Cell::new(0));
    let b_calls = Rc::new(Cell::new(0));
    let a = {
        let calls = a_calls.clone();
        Listener::new(move || calls.set(calls.get() + 1))
    };
    let b = {
        let calls = b_calls.clone();
        Listener::new(move || calls.set(calls.get() + 1))
    };

    s.render(Element::new("button", Props::new().on("click", a.clone())), container)
        .unwrap();
    s.flush();
    let button = s.host().find(container, "button").unwrap();

    s.host_mut().take_ops();
    s.render(Element::new("button", Props::new().on("click", b.clone())), container)
        .unwrap();
    s.flush();

    assert_eq!(s.host().find(container, "button"), Some(button));
    assert_eq!(
        s.host().ops(),
        [
            HostOp::RemoveListener {
                node: button,
                event: "click".into(),
                listener: a.id(),
            },
            HostOp::AddListener {
                node: button,
                event: "click".into(),
                listener: b.id(),
            },
        ]
    );
    assert_eq!(s.host().listener_count(button, "click"), 1);
    s.host().dispatch(button, "click");
    assert_eq!((a_calls.get(), b_calls.get()), (0, 1));
}

#[test]
fn unchanged_listener_issues_no_calls() {
    let (mut s, container) = setup();
    let listener = Listener::new(|| {});
    let app = || Element::new("button", Props::new().on("click", listener.clone()).attr("id", "go"));

    s.render(app(), container).unwrap();
    s.flush();
    s.host_mut().take_ops();
    s.render(app(), container).unwrap();
    s.flush();
    assert!(s.host().ops().is_empty());
}

#[test]
fn removed_attribute_is_cleared() {
    let (mut s, container) = setup();
    s.render(Element::new("div", Props::new().attr("title", "x").attr("id", "a")), container)
        .unwrap();
    s.flush();
    let div = s.host().find(container, "div").unwrap();

    s.render(Element::new("div", Props::new().attr("id", "b")), container)
        .unwrap();
    s.flush();
    assert_eq!(s.host().property(div, "title"), None);
    assert_eq!(s.host().property(div, "id"), Some(&Value::from("b")));
    assert_eq!(s.host().to_markup(div), "<div id=\"b\"></div>");
}

#[test]
fn shorter_list_keeps_leading_nodes_and_removes_the_tail() {
    let (mut s, container) = setup();
    s.render(items(&["a", "b", "c"]), container).unwrap();
    s.flush();
    let ul = s.host().find(container, "ul").unwrap();
    let before = s.host().children(ul).to_vec();

    s.host_mut().take_ops();
    s.render(items(&["a", "c"]), container).unwrap();
    s.flush();

    assert_eq!(s.host().inner_markup(container), "<ul><li>a</li><li>c</li></ul>");
    assert_eq!(s.host().children(ul), &before[..2], "leading nodes are reused");
    let structural: Vec<_> = s
        .host()
        .ops()
        .iter()
        .filter(|op| op.is_structural())
        .cloned()
        .collect();
    assert_eq!(
        structural,
        [HostOp::RemoveChild {
            parent: ul,
            child: before[2],
        }]
    );
}

#[test]
fn type_change_replaces_the_node() {
    let (mut s, container) = setup();
    s.render(build("div", Props::new(), [Child::from(Element::host("p"))]), container)
        .unwrap();
    s.flush();
    let p = s.host().find(container, "p").unwrap();

    s.render(build("div", Props::new(), [Child::from(Element::host("span"))]), container)
        .unwrap();
    s.flush();
    assert_eq!(s.host().inner_markup(container), "<div><span></span></div>");
    assert_eq!(s.host().parent(p), None);
}

#[test]
fn removing_a_component_detaches_its_host_nodes() {
    let (mut s, container) = setup();
    let with_counter = build(
        "div",
        Props::new(),
        [Child::from(Element::component(counter, Props::new()))],
    );
    s.render(with_counter, container).unwrap();
    s.flush();
    let h1 = s.host().find(container, "h1").unwrap();

    s.render(Element::new("div", Props::new()), container).unwrap();
    s.flush();
    assert_eq!(s.host().inner_markup(container), "<div></div>");
    assert_eq!(s.host().parent(h1), None);
}

fn alpha(hooks: &mut Hooks<'_>, _: &Props) -> Element {
    let (n, _) = hooks.use_state(100_u32);
    build("p", Props::new(), [Child::from(format!("alpha {n}"))])
}

fn beta(hooks: &mut Hooks<'_>, _: &Props) -> Element {
    let (n, _) = hooks.use_state(0_u32);
    build("p", Props::new(), [Child::from(format!("beta {n}"))])
}

#[test]
fn switching_function_pointers_remounts_the_component() {
    let (mut s, container) = setup();
    let table: [RenderPtr; 2] = [alpha, beta];

    s.render(Element::component(table[0], Props::new()), container)
        .unwrap();
    s.flush();
    let first = s.host().find(container, "p").unwrap();
    assert_eq!(s.host().text_content(container), "alpha 100");

    s.render(Element::component(table[1], Props::new()), container)
        .unwrap();
    s.run_slice(&UnitBudget::new(1));
    assert_eq!(s.pending_deletions().len(), 1, "old component is deleted");
    s.flush();
    assert_eq!(s.host().inner_markup(container), "<p>beta 0</p>");
    assert_eq!(s.host().parent(first), None);

    s.render(Element::component(table[1], Props::new()), container)
        .unwrap();
    s.host_mut().take_ops();
    s.flush();
    assert!(
        s.host().ops().iter().all(|op| !op.is_create() && !op.is_structural()),
        "same pointer keeps the position"
    );
}

#[test]
fn interrupted_walk_resumes_where_it_stopped() {
    let (mut s, container) = setup();
    s.render(items(&["a", "b", "c"]), container).unwrap();
    let budget = UnitBudget::new(2);
    let mut slices = 0;
    loop {
        budget.refill(2);
        let outcome = s.run_slice(&budget);
        slices += 1;
        if outcome.committed.is_some() {
            break;
        }
        assert!(s.next_unit().is_some());
        assert!(
            s.host().ops().iter().all(|op| !op.is_structural()),
            "nothing is attached before commit"
        );
        assert!(s.host().children(container).is_empty());
    }
    // root, ul, three li, three text leaves
    assert_eq!(slices, 4);
    assert_eq!(
        s.host().inner_markup(container),
        "<ul><li>a</li><li>b</li><li>c</li></ul>"
    );
}

#[test]
fn superseded_cycle_never_reaches_the_host() {
    let (mut s, container) = setup();
    s.render(items(&["a", "b"]), container).unwrap();
    s.flush();
    let committed = s.host().inner_markup(container);
    let old_cycle = s.cycle();

    s.host_mut().take_ops();
    s.render(items(&["x", "y", "z"]), container).unwrap();
    s.run_slice(&UnitBudget::new(3));
    s.render(items(&["a"]), container).unwrap();
    assert_eq!(s.cycle(), old_cycle + 2);
    assert_eq!(s.host().inner_markup(container), committed);
    assert!(s.host().ops().iter().all(|op| !op.is_structural()));

    s.flush();
    assert_eq!(s.host().inner_markup(container), "<ul><li>a</li></ul>");
}

#[test]
fn new_cycle_resets_the_deletion_set() {
    let (mut s, container) = setup();
    s.render(items(&["a", "b", "c"]), container).unwrap();
    s.flush();

    s.render(items(&["a"]), container).unwrap();
    // root, then ul reconciles its children against the old three
    s.run_slice(&UnitBudget::new(2));
    assert_eq!(s.pending_deletions().len(), 2);

    s.render(items(&["a", "b", "c"]), container).unwrap();
    assert!(s.pending_deletions().is_empty());
    s.flush();
    assert_eq!(
        s.host().inner_markup(container),
        "<ul><li>a</li><li>b</li><li>c</li></ul>"
    );
}

#[test]
fn state_update_mid_walk_restarts_the_cycle() {
    let (mut s, container) = setup();
    let app = || {
        build(
            "main",
            Props::new(),
            [
                Child::from(Element::component(counter, Props::new())),
                Child::from(items(&["a", "b"])),
            ],
        )
    };
    s.render(app(), container).unwrap();
    s.flush();
    let cycle = s.cycle();

    s.render(app(), container).unwrap();
    s.run_slice(&UnitBudget::new(2));
    click(&s, container);
    s.flush();
    assert_eq!(s.cycle(), cycle + 2);
    assert_eq!(
        s.host().inner_markup(container),
        "<main><h1>Count: 2</h1><ul><li>a</li><li>b</li></ul></main>"
    );
}

#[test]
fn state_update_rerenders_the_committed_tree() {
    let (mut s, container) = setup();
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    s.flush();

    s.render(items(&["x"]), container).unwrap();
    s.run_slice(&UnitBudget::new(1));
    click(&s, container);
    s.flush();
    assert_eq!(s.host().inner_markup(container), "<h1>Count: 2</h1>");
}

#[test]
fn rendering_into_another_container_moves_the_tree() {
    let (mut s, first) = setup();
    let second = s.host_mut().create_container();
    s.render(items(&["a"]), first).unwrap();
    s.flush();

    s.render(items(&["b"]), second).unwrap();
    assert_eq!(s.pending_deletions().len(), 1);
    s.flush();
    assert_eq!(s.host().inner_markup(first), "");
    assert_eq!(s.host().inner_markup(second), "<ul><li>b</li></ul>");
}

#[test]
fn invalid_container_is_rejected() {
    let (mut s, _) = setup();
    let text = s.host_mut().create_text_node();
    assert_eq!(
        s.render(items(&["a"]), text),
        Err(RenderError::InvalidContainer)
    );
    assert_eq!(
        s.render(items(&["a"]), NodeId(99)),
        Err(RenderError::InvalidContainer)
    );
}

fn conditional_hooks(hooks: &mut Hooks<'_>, props: &Props) -> Element {
    let (_, _) = hooks.use_state(0_u8);
    if props.get("twice") == Some(&Value::Bool(true)) {
        let (_, _) = hooks.use_state(0_u8);
    }
    Element::host("div")
}

#[test]
#[should_panic(expected = "hook order changed between renders")]
fn changing_hook_count_panics() {
    let (mut s, container) = setup();
    s.render(
        Element::component(conditional_hooks, Props::new().attr("twice", true)),
        container,
    )
    .unwrap();
    s.flush();
    s.render(
        Element::component(conditional_hooks, Props::new().attr("twice", false)),
        container,
    )
    .unwrap();
    s.flush();
}

fn two_counters(hooks: &mut Hooks<'_>, _: &Props) -> Element {
    let (a, set_a) = hooks.use_state(0_u32);
    let (b, set_b) = hooks.use_state(10_u32);
    build(
        "p",
        Props::new()
            .on("click", Listener::new(move || set_a.set(|a| a + 1)))
            .on("dblclick", Listener::new(move || {
                set_b.set(|b| b * 2);
                set_b.replace(7);
                set_b.set(|b| b + 1);
            })),
        [Child::from(format!("{a}/{b}"))],
    )
}

#[test]
fn hooks_keep_their_positions_and_apply_updates_in_order() {
    let (mut s, container) = setup();
    s.render(Element::component(two_counters, Props::new()), container)
        .unwrap();
    s.flush();
    let p = s.host().find(container, "p").unwrap();

    s.host().dispatch(p, "click");
    s.host().dispatch(p, "dblclick");
    s.flush();
    assert_eq!(s.host().text_content(p), "1/8");
}

#[test]
fn committed_tree_is_the_only_tree_left() {
    let (mut s, container) = setup();
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    s.flush();
    // root, component, h1, text
    assert_eq!(s.fibers().live_count(), 4);

    for _ in 0..20 {
        click(&s, container);
        s.flush();
        assert_eq!(s.fibers().live_count(), 4);
        assert!(s.pending_deletions().is_empty());
        assert_eq!(s.next_unit(), None);
        assert_eq!(s.work_in_progress_root(), None);
    }
    assert_eq!(s.host().text_content(container), "Count: 21");

    let root = s.current_root().unwrap();
    assert!(matches!(s.fibers().kind(root), FiberKind::Root));
    assert!(
        s.fibers()
            .descendants(root)
            .all(|fiber| s.fibers().alternate(fiber).is_none())
    );
}

#[test]
fn component_fibers_have_no_node_but_hold_hooks() {
    let (mut s, container) = setup();
    s.render(Element::component(two_counters, Props::new()), container)
        .unwrap();
    s.flush();
    let root = s.current_root().unwrap();
    let component = s.fibers().first_child(root).unwrap();
    assert!(matches!(s.fibers().kind(component), FiberKind::Component(_)));
    assert_eq!(s.fibers().node(component), None);
    assert_eq!(s.fibers().hook_count(component), 2);
    let p = s.fibers().first_child(component).unwrap();
    assert_eq!(s.fibers().host_ancestor(p), Some(root));
}

#[test]
fn render_request_replays_queued_updates() {
    let (mut s, container) = setup();
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    s.flush();
    click(&s, container);
    s.render(Element::component(counter, Props::new()), container)
        .unwrap();
    s.flush();
    assert_eq!(s.host().text_content(container), "Count: 2");
}

#[test]
fn scheduler_works_through_a_dyn_clock() {
    let (mut s, container) = setup();
    s.render(items(&["a"]), container).unwrap();
    let clocks: [&dyn crate::clock::YieldClock; 2] = [&UnitBudget::new(2), &Unbounded];
    assert_eq!(s.run_slice(clocks[0]).units, 2);
    assert!(s.run_slice(clocks[1]).committed.is_some());
}

#[cfg(feature = "trace")]
mod traced {
    use super::*;
    use crate::trace::{CycleCause, CycleScheduledEvent, CycleSummary, SliceEvent, TraceSink, Tracer};

    #[derive(Default)]
    struct Collect {
        scheduled: Vec<CycleScheduledEvent>,
        slices: Vec<SliceEvent>,
        summaries: Vec<CycleSummary>,
    }

    impl TraceSink for Collect {
        fn on_cycle_scheduled(&mut self, e: &CycleScheduledEvent) {
            self.scheduled.push(*e);
        }

        fn on_slice(&mut self, e: &SliceEvent) {
            self.slices.push(*e);
        }

        fn on_cycle_summary(&mut self, s: &CycleSummary) {
            self.summaries.push(*s);
        }
    }

    #[test]
    fn summaries_count_units_slices_and_effects() {
        let (mut s, container) = setup();
        let mut sink = Collect::default();
        s.render(items(&["a", "b"]), container).unwrap();
        let budget = UnitBudget::new(4);
        while s.has_pending_work() {
            budget.refill(4);
            s.run_slice_traced(&budget, &mut Tracer::new(&mut sink));
        }

        assert_eq!(sink.scheduled.len(), 1);
        assert_eq!(sink.scheduled[0].cause, CycleCause::Render);
        assert_eq!(sink.slices.len(), 2);
        assert!(sink.slices[0].yielded);
        assert!(!sink.slices[1].yielded);

        let [summary] = sink.summaries.as_slice() else {
            panic!("expected one summary, got {}", sink.summaries.len());
        };
        assert_eq!(summary.units, 6);
        assert_eq!(summary.slices, 2);
        assert_eq!(summary.placements, 5);
        assert_eq!(summary.updates, 0);
    }

    #[test]
    fn restart_reports_the_superseded_cycle() {
        let (mut s, container) = setup();
        let mut sink = Collect::default();
        s.render(Element::component(counter, Props::new()), container)
            .unwrap();
        s.flush();
        click(&s, container);
        s.render(items(&["a"]), container).unwrap();
        s.run_slice_traced(&UnitBudget::new(1), &mut Tracer::new(&mut sink));
        click(&s, container);
        s.run_slice_traced(&Unbounded, &mut Tracer::new(&mut sink));

        assert_eq!(sink.scheduled.len(), 2);
        assert_eq!(sink.scheduled[1].cause, CycleCause::StateUpdate);
        assert_eq!(sink.scheduled[1].superseded, Some(sink.scheduled[0].cycle));
        assert_eq!(sink.summaries.len(), 1);
        // Both clicks were queued on the committed counter.
        assert_eq!(s.host().inner_markup(container), "<h1>Count: 3</h1>");
    }
}
