// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestIdleCallback` work loop.
//!
//! [`IdleLoop`] asks the browser for idle periods and hands each one to a
//! callback as a [`YieldClock`]. The clock reports
//! [`IdleDeadline.timeRemaining()`][mdn] converted to microsecond ticks, and
//! timestamps come from `performance.now()`.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/IdleDeadline/timeRemaining

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use weft_core::clock::YieldClock;
use weft_core::time::{Duration, HostTime};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestIdleCallback")]
    fn request_idle_callback(callback: &JsValue) -> u32;

    #[wasm_bindgen(js_name = "cancelIdleCallback")]
    fn cancel_idle_callback(id: u32);

    type IdleDeadline;

    #[wasm_bindgen(method, js_name = "timeRemaining")]
    fn time_remaining(this: &IdleDeadline) -> f64;
}

/// Converts a millisecond `DOMHighResTimeStamp` or duration to microsecond
/// ticks. Negative and NaN inputs clamp to zero.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "clamped to a non-negative value; µs fits in u64"
)]
pub(crate) fn ms_to_ticks(ms: f64) -> u64 {
    (ms.max(0.0) * 1000.0) as u64
}

/// The [`YieldClock`] view of one idle period.
struct DeadlineClock<'a>(&'a IdleDeadline);

impl YieldClock for DeadlineClock<'_> {
    fn time_remaining(&self) -> Duration {
        Duration(ms_to_ticks(self.0.time_remaining()))
    }

    fn now(&self) -> HostTime {
        HostTime(ms_to_ticks(performance_now()))
    }
}

/// A `requestIdleCallback` loop that hands idle periods to a callback.
///
/// Create with [`IdleLoop::new`], then call [`start`](Self::start). The loop
/// re-registers itself after every idle period until [`stop`](Self::stop) is
/// called or the `IdleLoop` is dropped.
pub struct IdleLoop {
    inner: Rc<IdleInner>,
}

type IdleClosure = Closure<dyn FnMut(IdleDeadline)>;

struct IdleInner {
    closure: RefCell<Option<IdleClosure>>,
    callback: RefCell<Box<dyn FnMut(&dyn YieldClock)>>,
    periods: Cell<u64>,
    running: Cell<bool>,
    idle_id: Cell<u32>,
}

impl IdleLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(callback: impl FnMut(&dyn YieldClock) + 'static) -> Self {
        Self {
            inner: Rc::new(IdleInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                periods: Cell::new(0),
                running: Cell::new(false),
                idle_id: Cell::new(0),
            }),
        }
    }

    /// Starts the loop. If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |deadline: IdleDeadline| {
                if !inner.running.get() {
                    return;
                }
                inner.periods.set(inner.periods.get() + 1);
                inner.callback.borrow_mut()(&DeadlineClock(&deadline));

                if inner.running.get()
                    && let Some(ref closure) = *inner.closure.borrow()
                {
                    let id = request_idle_callback(closure.as_ref().unchecked_ref());
                    inner.idle_id.set(id);
                }
            }) as Box<dyn FnMut(IdleDeadline)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_idle_callback(closure.as_ref().unchecked_ref());
            self.inner.idle_id.set(id);
        }
    }

    /// Stops the loop and cancels the pending idle callback. Can be restarted
    /// with [`start`](Self::start).
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_idle_callback(self.inner.idle_id.get());
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Returns the number of idle periods handled so far.
    #[must_use]
    pub fn periods(&self) -> u64 {
        self.inner.periods.get()
    }
}

impl Drop for IdleLoop {
    fn drop(&mut self) {
        self.stop();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for IdleLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleLoop")
            .field("running", &self.inner.running.get())
            .field("periods", &self.inner.periods.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliseconds_become_microsecond_ticks() {
        assert_eq!(ms_to_ticks(0.0), 0);
        assert_eq!(ms_to_ticks(1.0), 1_000);
        assert_eq!(ms_to_ticks(12.3456), 12_345);
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(ms_to_ticks(-4.0), 0);
        assert_eq!(ms_to_ticks(f64::NAN), 0);
    }
}
