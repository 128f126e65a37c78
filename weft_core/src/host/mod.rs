// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for host output trees.
//!
//! Weft never touches platform nodes itself. A *host* creates nodes, sets
//! their properties, wires listeners and links them into a tree, and the
//! engine drives it through [`HostRenderer`]. Two hosts ship with the
//! workspace:
//!
//! - [`memory::MemoryHost`], an in-memory tree with a mutation log, used for
//!   headless rendering and tests.
//! - `weft_backend_web::DomRenderer`, which drives the browser DOM.
//!
//! # Crate boundaries
//!
//! `weft_core` owns the fiber tree, reconciliation, scheduling, and this
//! contract module. Backend crates depend on `weft_core` and provide platform
//! glue (a [`HostRenderer`] and something that calls
//! [`Scheduler::run_slice`](crate::scheduler::Scheduler::run_slice) whenever
//! the platform grants idle time).

pub mod memory;

use crate::props::{Listener, Value};

/// Creates and mutates nodes of a host output tree.
///
/// Node creation and property setup on a fresh node happen while rendering;
/// such nodes are detached until the commit phase appends them. Every call
/// that touches an attached node happens during commit.
///
/// # Work loop pseudocode
///
/// A host idle callback wires the pieces together like this:
///
/// ```rust,ignore
/// fn on_idle(deadline: IdleDeadline) {
///     // Render units until the slice runs out, committing if the walk ends.
///     let outcome = scheduler.run_slice(&deadline);
///
///     // Keep granting slices while work remains.
///     if outcome.pending {
///         request_idle_callback(on_idle);
///     }
/// }
/// ```
pub trait HostRenderer {
    /// A handle to a host node. Handles are compared to detect a change of
    /// render container.
    type Node: Clone + PartialEq;

    /// Creates a detached element node of the given kind.
    fn create_node(&mut self, kind: &str) -> Self::Node;

    /// Creates a detached, empty text node.
    fn create_text_node(&mut self) -> Self::Node;

    /// Sets a property. Text nodes receive their content as `nodeValue`.
    fn set_property(&mut self, node: &Self::Node, name: &str, value: &Value);

    /// Clears a property that is no longer present.
    fn clear_property(&mut self, node: &Self::Node, name: &str);

    /// Registers a listener for `event`.
    fn add_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);

    /// Unregisters a listener previously passed to
    /// [`add_listener`](Self::add_listener).
    fn remove_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Removes `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Returns whether `node` can hold a rendered tree.
    fn is_container(&self, node: &Self::Node) -> bool {
        _ = node;
        true
    }
}
