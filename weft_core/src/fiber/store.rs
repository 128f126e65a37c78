// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays fiber storage with allocation, topology and payload access.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::element::{Component, ElementType};
use crate::hooks::HookSlot;
use crate::props::Props;

use super::id::{FiberId, INVALID};
use super::traverse::{Children, Descendants};

/// What a fiber stands for.
#[derive(Clone, Debug)]
pub enum FiberKind {
    /// The root of a render; its host node is the container.
    Root,
    /// A host node of the named kind.
    Host(Cow<'static, str>),
    /// A text leaf.
    Text,
    /// A function component. It never owns a host node.
    Component(Component),
}

impl FiberKind {
    /// Returns whether a new element of type `kind` may reuse this position.
    #[must_use]
    pub fn matches(&self, kind: &ElementType) -> bool {
        match (self, kind) {
            (Self::Host(a), ElementType::Host(b)) => a == b,
            (Self::Text, ElementType::Text) => true,
            (Self::Component(a), ElementType::Component(b)) => a.same_type(b),
            _ => false,
        }
    }

    /// Returns whether fibers of this kind own a host node once processed.
    #[must_use]
    pub fn is_host_backed(&self) -> bool {
        matches!(self, Self::Root | Self::Host(_) | Self::Text)
    }
}

impl From<ElementType> for FiberKind {
    fn from(kind: ElementType) -> Self {
        match kind {
            ElementType::Host(name) => Self::Host(name),
            ElementType::Text => Self::Text,
            ElementType::Component(component) => Self::Component(component),
        }
    }
}

/// The host mutation a fiber asks the commit phase for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTag {
    /// Attach the fiber's new host node under its nearest host ancestor.
    Placement,
    /// Diff the alternate's props into the reused host node.
    Update,
    /// Remove the fiber's host subtree.
    Deletion,
}

/// Everything needed to allocate a fiber.
#[derive(Debug)]
pub(crate) struct NewFiber<N> {
    pub(crate) kind: FiberKind,
    pub(crate) props: Props,
    pub(crate) node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Option<EffectTag>,
}

/// Struct-of-arrays storage for all fibers.
///
/// Fibers are addressed by [`FiberId`] handles. Internally, each fiber occupies
/// a slot in parallel arrays. Freed fibers are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// `N` is the host's node handle type.
#[derive(Debug)]
pub struct FiberStore<N> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) alternate: Vec<u32>,

    // -- Payload --
    pub(crate) kind: Vec<FiberKind>,
    pub(crate) props: Vec<Props>,
    pub(crate) node: Vec<Option<N>>,
    pub(crate) effect: Vec<Option<EffectTag>>,
    pub(crate) hooks: Vec<Vec<HookSlot>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl<N> Default for FiberStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> FiberStore<N> {
    /// Creates an empty fiber store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            alternate: Vec::new(),
            kind: Vec::new(),
            props: Vec::new(),
            node: Vec::new(),
            effect: Vec::new(),
            hooks: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Allocates a fiber and returns its handle. The fiber has no children.
    pub(crate) fn create(&mut self, fiber: NewFiber<N>) -> FiberId {
        let parent = fiber.parent.map_or(INVALID, |p| {
            self.validate(p);
            p.idx
        });
        let alternate = fiber.alternate.map_or(INVALID, |a| {
            self.validate(a);
            a.idx
        });

        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = parent;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.alternate[i] = alternate;
            self.kind[i] = fiber.kind;
            self.props[i] = fiber.props;
            self.node[i] = fiber.node;
            self.effect[i] = fiber.effect;
            self.hooks[i] = Vec::new();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(parent);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.alternate.push(alternate);
            self.kind.push(fiber.kind);
            self.props.push(fiber.props);
            self.node.push(fiber.node);
            self.effect.push(fiber.effect);
            self.hooks.push(Vec::new());
            self.generation.push(0);
            idx
        };

        self.id_at(idx)
    }

    /// Frees `root` and every fiber below it.
    ///
    /// Payloads are dropped immediately (releasing hook slots and component
    /// closures); host nodes are not touched.
    pub(crate) fn free_tree(&mut self, root: FiberId) {
        self.validate(root);
        let slots: Vec<u32> = self.descendants(root).map(|id| id.idx).collect();
        for idx in slots {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.alternate[i] = INVALID;
            // Vacant slots hold an inert kind.
            self.kind[i] = FiberKind::Root;
            self.props[i] = Props::new();
            self.node[i] = None;
            self.effect[i] = None;
            self.hooks[i] = Vec::new();
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.free_list.push(idx);
        }
    }

    /// Returns whether the given handle refers to a live fiber.
    #[must_use]
    pub fn is_alive(&self, id: FiberId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live fibers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the number of allocated slots, live or free.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.len as usize
    }

    // -- Topology API --

    /// Returns the parent of a fiber, if any.
    #[must_use]
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.parent[id.idx as usize])
    }

    /// Returns the first child of a fiber, if any.
    #[must_use]
    pub fn first_child(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.first_child[id.idx as usize])
    }

    /// Returns the next sibling of a fiber, if any.
    #[must_use]
    pub fn next_sibling(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.next_sibling[id.idx as usize])
    }

    /// Returns the fiber that held this position in the last committed tree.
    ///
    /// Cleared once the fiber's own tree is committed.
    #[must_use]
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.alternate[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a fiber.
    #[must_use]
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns a pre-order iterator over the subtree rooted at `id`.
    #[must_use]
    pub fn descendants(&self, id: FiberId) -> Descendants<'_, N> {
        self.validate(id);
        Descendants::new(self, id.idx)
    }

    /// Walks parent links from `id` (exclusive) to the first fiber that owns
    /// a host node.
    #[must_use]
    pub fn host_ancestor(&self, id: FiberId) -> Option<FiberId> {
        let mut current = self.parent(id)?;
        while self.node[current.idx as usize].is_none() {
            current = self.parent(current)?;
        }
        Some(current)
    }

    pub(crate) fn set_first_child(&mut self, parent: FiberId, child: Option<FiberId>) {
        self.validate(parent);
        self.first_child[parent.idx as usize] = child.map_or(INVALID, |c| c.idx);
    }

    pub(crate) fn set_next_sibling(&mut self, id: FiberId, sibling: Option<FiberId>) {
        self.validate(id);
        self.next_sibling[id.idx as usize] = sibling.map_or(INVALID, |s| s.idx);
    }

    /// Drops the alternate links of a whole tree.
    pub(crate) fn clear_alternates(&mut self, root: FiberId) {
        let slots: Vec<u32> = self.descendants(root).map(|id| id.idx).collect();
        for idx in slots {
            self.alternate[idx as usize] = INVALID;
        }
    }

    // -- Payload API --

    /// Returns the kind of a fiber.
    #[must_use]
    pub fn kind(&self, id: FiberId) -> &FiberKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the props of a fiber.
    ///
    /// Host fibers hand their children to reconciliation when processed, so
    /// `children()` is empty on them afterwards.
    #[must_use]
    pub fn props(&self, id: FiberId) -> &Props {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Returns the host node owned by a fiber.
    #[must_use]
    pub fn node(&self, id: FiberId) -> Option<&N> {
        self.validate(id);
        self.node[id.idx as usize].as_ref()
    }

    /// Returns the effect tag of a fiber.
    #[must_use]
    pub fn effect(&self, id: FiberId) -> Option<EffectTag> {
        self.validate(id);
        self.effect[id.idx as usize]
    }

    /// Returns the number of hooks recorded on a fiber.
    #[must_use]
    pub fn hook_count(&self, id: FiberId) -> usize {
        self.validate(id);
        self.hooks[id.idx as usize].len()
    }

    pub(crate) fn hooks(&self, id: FiberId) -> &[HookSlot] {
        self.validate(id);
        &self.hooks[id.idx as usize]
    }

    pub(crate) fn set_hooks(&mut self, id: FiberId, hooks: Vec<HookSlot>) {
        self.validate(id);
        self.hooks[id.idx as usize] = hooks;
    }

    pub(crate) fn set_node(&mut self, id: FiberId, node: N) {
        self.validate(id);
        self.node[id.idx as usize] = Some(node);
    }

    pub(crate) fn set_effect(&mut self, id: FiberId, effect: EffectTag) {
        self.validate(id);
        self.effect[id.idx as usize] = Some(effect);
    }

    pub(crate) fn take_children(&mut self, id: FiberId) -> Vec<crate::element::Element> {
        self.validate(id);
        self.props[id.idx as usize].take_children()
    }

    // -- Internal helpers --

    pub(crate) fn id_at(&self, idx: u32) -> FiberId {
        FiberId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn link(&self, idx: u32) -> Option<FiberId> {
        (idx != INVALID).then(|| self.id_at(idx))
    }

    /// Panics if `id` is stale.
    pub(crate) fn validate(&self, id: FiberId) {
        assert!(
            self.is_alive(id),
            "stale FiberId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}
