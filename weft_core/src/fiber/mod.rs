// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber tree data model.
//!
//! A *fiber* is the unit of render work and the record of one position in the
//! output tree. Each fiber has:
//!
//! - An identity ([`FiberId`]), a generational handle that goes stale when the
//!   tree holding the fiber is freed.
//! - Topology: parent, first-child and next-sibling links forming an ordered
//!   tree, plus an *alternate* link to the fiber that held the same position in
//!   the last committed tree.
//! - A [`FiberKind`], its [`Props`](crate::props::Props), an optional host
//!   node handle, an optional [`EffectTag`] and, for components, a hook list.
//!
//! Two trees share one [`FiberStore`]: the committed tree and the tree being
//! built. The scheduler frees a whole tree once nothing refers to it (the old
//! committed tree after a commit, or a superseded work-in-progress tree).

mod id;
mod store;
mod traverse;

pub use id::{FiberId, INVALID};
pub use store::{EffectTag, FiberKind, FiberStore};
pub(crate) use store::NewFiber;
pub use traverse::{Children, Descendants};
