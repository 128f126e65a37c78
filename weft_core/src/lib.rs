// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental, interruptible UI rendering over a pluggable host tree.
//!
//! `weft_core` turns element descriptions into mutations of a host output tree
//! (the browser DOM, an in-memory tree, anything implementing
//! [`HostRenderer`](host::HostRenderer)). It is `no_std` compatible (with
//! `alloc`) and keeps its fibers in array-based struct-of-arrays storage with
//! generational index handles.
//!
//! # Architecture
//!
//! Rendering is split into an interruptible render phase and an atomic commit
//! phase, driven by idle time granted by the host:
//!
//! ```text
//!   Scheduler::render(element, container)      SetState::set()
//!       │                                           │
//!       ▼                                           ▼
//!   new root fiber ◄────────── restart ─────── update signal
//!       │
//!       ▼
//!   run_slice(clock) ──► perform unit ──► reconcile children ──► next unit
//!       │                     ▲                                      │
//!       │                     └──────────── time left? ◄─────────────┘
//!       ▼
//!   walk done ──► commit_root ──► HostRenderer calls
//! ```
//!
//! **[`element`]**: Immutable element descriptions and the [`build`](element::build)
//! helper that normalizes raw values into text leaves.
//!
//! **[`fiber`]**: Struct-of-arrays fiber store with parent, first-child and
//! next-sibling links, alternates, and depth-first traversal.
//!
//! **[`hooks`]**: Positional per-component state with queued updates.
//!
//! **[`reconcile`]**: Positional same-level diffing of new children against
//! the alternate's children.
//!
//! **[`scheduler`]**: The work loop. Owns both trees, the deletion set and the
//! cursor, and decides when to yield and when to commit.
//!
//! **[`commit`]**: Flushes deletions, placements and property diffs to the host
//! in one uninterrupted pass.
//!
//! **[`host`]**: The [`HostRenderer`](host::HostRenderer) contract and the
//! in-memory [`MemoryHost`](host::memory::MemoryHost).
//!
//! **[`clock`]**: [`YieldClock`](clock::YieldClock) and deterministic clocks for
//! headless hosts.
//!
//! **[`props`]**: Property values, listeners and property diffs.
//!
//! **[`time`]**: Host time and durations in platform ticks.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! work-loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use weft_core::clock::Unbounded;
//! use weft_core::element::{Child, build};
//! use weft_core::host::memory::MemoryHost;
//! use weft_core::props::Props;
//! use weft_core::scheduler::{Scheduler, SchedulerConfig};
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let mut scheduler = Scheduler::new(host, SchedulerConfig::headless());
//!
//! let app = build("h1", Props::new().attr("title", "greeting"), [Child::from("Hello")]);
//! scheduler.render(app, container).unwrap();
//! while scheduler.run_slice(&Unbounded).pending {}
//!
//! assert_eq!(
//!     scheduler.host().inner_markup(container),
//!     "<h1 title=\"greeting\">Hello</h1>"
//! );
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-fiber
//!   effect batches at commit.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod commit;
pub mod element;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod props;
pub mod reconcile;
pub mod scheduler;
pub mod time;
pub mod trace;

#[cfg(test)]
mod tests;
