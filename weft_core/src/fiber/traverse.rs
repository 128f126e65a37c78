// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{FiberId, INVALID};
use super::store::FiberStore;

/// An iterator over the direct children of a fiber.
///
/// Created by [`FiberStore::children`].
#[derive(Debug)]
pub struct Children<'a, N> {
    store: &'a FiberStore<N>,
    current: u32,
}

impl<'a, N> Children<'a, N> {
    pub(crate) fn new(store: &'a FiberStore<N>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// A depth-first pre-order iterator over a subtree, root included.
///
/// Created by [`FiberStore::descendants`]. This is the order in which the
/// work loop processes units and the commit phase applies effects.
#[derive(Debug)]
pub struct Descendants<'a, N> {
    store: &'a FiberStore<N>,
    root: u32,
    current: u32,
}

impl<'a, N> Descendants<'a, N> {
    pub(crate) fn new(store: &'a FiberStore<N>, root: u32) -> Self {
        Self {
            store,
            root,
            current: root,
        }
    }
}

impl<N> Iterator for Descendants<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.successor(self.root, idx);
        Some(self.store.id_at(idx))
    }
}

impl<N> FiberStore<N> {
    /// Returns the slot after `idx` in pre-order, staying inside the subtree
    /// rooted at `root`: the first child if any, otherwise the next sibling of
    /// the nearest ancestor (or `idx` itself) that has one.
    pub(crate) fn successor(&self, root: u32, idx: u32) -> u32 {
        let child = self.first_child[idx as usize];
        if child != INVALID {
            return child;
        }
        let mut current = idx;
        while current != root {
            let sibling = self.next_sibling[current as usize];
            if sibling != INVALID {
                return sibling;
            }
            current = self.parent[current as usize];
            if current == INVALID {
                break;
            }
        }
        INVALID
    }

    /// Returns the fiber processed after `id` when walking the tree rooted at
    /// `root`, or `None` once the walk is complete.
    #[must_use]
    pub fn next_unit(&self, root: FiberId, id: FiberId) -> Option<FiberId> {
        self.validate(root);
        self.validate(id);
        match self.successor(root.idx, id.idx) {
            INVALID => None,
            idx => Some(self.id_at(idx)),
        }
    }
}
