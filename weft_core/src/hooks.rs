// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional state for function components.
//!
//! A component receives a [`Hooks`] handle while it renders. Each
//! [`use_state`](Hooks::use_state) call claims the next slot in the fiber's
//! hook list, so calls must happen in the same order on every render of a
//! component instance. The previous render's slot at the same position is
//! found through the fiber's alternate.
//!
//! A [`SetState`] never touches the scheduler directly. It appends an update
//! function to its slot's queue and raises the scheduler's update signal; the
//! next render replays the queue from the committed slot.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;

/// A type-erased hook slot stored on a fiber.
pub(crate) type HookSlot = Rc<dyn Any>;

/// Shared flag telling the scheduler that some state changed.
#[derive(Clone, Debug, Default)]
pub(crate) struct UpdateSignal(Rc<Cell<bool>>);

impl UpdateSignal {
    pub(crate) fn raise(&self) {
        self.0.set(true);
    }

    /// Clears the flag, returning whether it was raised.
    pub(crate) fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.0.get()
    }
}

type Action<T> = Rc<dyn Fn(&T) -> T>;

struct StateHook<T> {
    state: T,
    queue: Vec<Action<T>>,
}

/// The hook context handed to a component while it renders.
pub struct Hooks<'a> {
    previous: Option<&'a [HookSlot]>,
    current: Vec<HookSlot>,
    signal: &'a UpdateSignal,
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("previous", &self.previous.map(<[HookSlot]>::len))
            .field("cursor", &self.current.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Hooks<'a> {
    /// Starts an evaluation. `previous` is the alternate fiber's hook list, or
    /// `None` when the component is rendering at this position for the first
    /// time.
    pub(crate) fn new(previous: Option<&'a [HookSlot]>, signal: &'a UpdateSignal) -> Self {
        Self {
            previous,
            current: Vec::new(),
            signal,
        }
    }

    /// Returns the settled state for the next hook position and a setter.
    ///
    /// On the first render the state is `initial`. On later renders it is the
    /// previous render's state with every queued update applied in order.
    ///
    /// # Panics
    ///
    /// Panics if hooks are called in a different order or number than on the
    /// previous render of this component instance.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, SetState<T>) {
        let index = self.current.len();
        let state = match self.previous {
            Some(previous) => {
                assert!(
                    index < previous.len(),
                    "hook order changed between renders: hook {index} did not exist before"
                );
                let Ok(slot) = Rc::clone(&previous[index]).downcast::<RefCell<StateHook<T>>>()
                else {
                    panic!("hook order changed between renders: hook {index} holds another state type");
                };
                let slot = slot.borrow();
                slot.queue
                    .iter()
                    .fold(slot.state.clone(), |state, action| action(&state))
            }
            None => initial,
        };

        let hook = Rc::new(RefCell::new(StateHook {
            state: state.clone(),
            queue: Vec::new(),
        }));
        self.current.push(hook.clone());
        (
            state,
            SetState {
                hook,
                signal: self.signal.clone(),
            },
        )
    }

    /// Ends the evaluation and returns the new hook list.
    ///
    /// # Panics
    ///
    /// Panics if fewer hooks were used than on the previous render.
    pub(crate) fn finish(self) -> Vec<HookSlot> {
        if let Some(previous) = self.previous {
            assert_eq!(
                self.current.len(),
                previous.len(),
                "hook order changed between renders: hook count differs"
            );
        }
        self.current
    }
}

/// Enqueues state updates for one hook slot.
///
/// Every call schedules a full re-render from the root.
pub struct SetState<T> {
    hook: Rc<RefCell<StateHook<T>>>,
    signal: UpdateSignal,
}

impl<T: 'static> SetState<T> {
    /// Enqueues an update function applied to the state on the next render.
    pub fn set(&self, update: impl Fn(&T) -> T + 'static) {
        self.hook.borrow_mut().queue.push(Rc::new(update));
        self.signal.raise();
    }

    /// Enqueues a replacement value.
    pub fn replace(&self, value: T)
    where
        T: Clone,
    {
        self.set(move |_| value.clone());
    }

    /// Returns the number of updates queued on this slot.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.hook.borrow().queue.len()
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            hook: Rc::clone(&self.hook),
            signal: self.signal.clone(),
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("pending", &self.hook.borrow().queue.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_render(signal: &UpdateSignal) -> (Vec<HookSlot>, SetState<i32>) {
        let mut hooks = Hooks::new(None, signal);
        let (count, set) = hooks.use_state(1);
        assert_eq!(count, 1);
        (hooks.finish(), set)
    }

    #[test]
    fn queued_updates_replay_in_order() {
        let signal = UpdateSignal::default();
        let (slots, set) = first_render(&signal);
        set.set(|n| n + 1);
        set.set(|n| n * 10);
        set.set(|n| n + 1);
        assert!(signal.is_raised());

        let mut hooks = Hooks::new(Some(&slots), &signal);
        let (count, _) = hooks.use_state(99);
        assert_eq!(count, 21);
    }

    #[test]
    fn replay_leaves_the_previous_slot_untouched() {
        let signal = UpdateSignal::default();
        let (slots, set) = first_render(&signal);
        set.set(|n| n + 1);

        for _ in 0..2 {
            let mut hooks = Hooks::new(Some(&slots), &signal);
            let (count, _) = hooks.use_state(0);
            assert_eq!(count, 2);
        }
        assert_eq!(set.pending(), 1);
    }

    #[test]
    fn new_slot_starts_with_empty_queue() {
        let signal = UpdateSignal::default();
        let (slots, set) = first_render(&signal);
        set.replace(7);

        let mut hooks = Hooks::new(Some(&slots), &signal);
        let (count, next) = hooks.use_state(0);
        assert_eq!(count, 7);
        assert_eq!(next.pending(), 0);
    }

    #[test]
    fn signal_take_clears() {
        let signal = UpdateSignal::default();
        signal.raise();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    #[should_panic(expected = "hook order changed")]
    fn extra_hook_panics() {
        let signal = UpdateSignal::default();
        let (slots, _) = first_render(&signal);
        let mut hooks = Hooks::new(Some(&slots), &signal);
        let _ = hooks.use_state(0);
        let _ = hooks.use_state(0);
    }

    #[test]
    #[should_panic(expected = "hook order changed")]
    fn missing_hook_panics() {
        let signal = UpdateSignal::default();
        let (slots, _) = first_render(&signal);
        let hooks = Hooks::new(Some(&slots), &signal);
        let _ = hooks.finish();
    }

    #[test]
    #[should_panic(expected = "hook order changed")]
    fn type_change_panics() {
        let signal = UpdateSignal::default();
        let (slots, _) = first_render(&signal);
        let mut hooks = Hooks::new(Some(&slots), &signal);
        let _ = hooks.use_state(false);
    }
}
