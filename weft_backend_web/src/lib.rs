// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for weft.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomRenderer`]: a [`HostRenderer`] over `web_sys::Node`
//! - [`IdleLoop`]: `requestIdleCallback` slice source
//! - [`mount`]: wires both to a [`Scheduler`] and keeps it running

#![no_std]

extern crate alloc;

mod dom;
mod idle;

pub use dom::DomRenderer;
pub use idle::IdleLoop;
pub use weft_core::host::HostRenderer;

use alloc::rc::Rc;
use core::cell::RefCell;

use web_sys::Node;
use weft_core::element::Element;
use weft_core::scheduler::{RenderError, Scheduler, SchedulerConfig};
use weft_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(idle::ms_to_ticks(idle::performance_now()))
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

/// A render root attached to a DOM container.
///
/// The idle loop runs for as long as the `WebRoot` is alive; dropping it
/// cancels the pending idle callback. The committed DOM stays in place.
pub struct WebRoot {
    scheduler: Rc<RefCell<Scheduler<DomRenderer>>>,
    container: Node,
    idle: IdleLoop,
}

impl core::fmt::Debug for WebRoot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebRoot")
            .field("idle", &self.idle)
            .finish_non_exhaustive()
    }
}

impl WebRoot {
    /// Schedules a render of `element` into this root's container.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the container is no longer accepted.
    pub fn render(&self, element: Element) -> Result<(), RenderError> {
        self.scheduler
            .borrow_mut()
            .render(element, self.container.clone())
    }

    /// Returns whether a render cycle is still in progress.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.borrow().has_pending_work()
    }

    /// Returns the number of cycles scheduled so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.scheduler.borrow().cycle()
    }

    /// Returns the idle loop driving this root.
    #[must_use]
    pub fn idle_loop(&self) -> &IdleLoop {
        &self.idle
    }
}

/// Renders `element` into `container` and starts the idle loop.
///
/// # Errors
///
/// Returns [`RenderError::InvalidContainer`] if `container` is not an element
/// attached to a document.
pub fn mount(element: Element, container: &web_sys::Element) -> Result<WebRoot, RenderError> {
    let document = container
        .owner_document()
        .ok_or(RenderError::InvalidContainer)?;
    let container: Node = container.clone().into();

    let mut scheduler = Scheduler::new(DomRenderer::new(document), SchedulerConfig::web());
    scheduler.render(element, container.clone())?;
    let scheduler = Rc::new(RefCell::new(scheduler));

    let driven = Rc::clone(&scheduler);
    let idle = IdleLoop::new(move |clock| {
        let mut scheduler = driven.borrow_mut();
        if scheduler.has_pending_work() {
            scheduler.run_slice(clock);
        }
    });
    idle.start();

    Ok(WebRoot {
        scheduler,
        container,
        idle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }
}
