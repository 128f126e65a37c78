// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host tree.
//!
//! [`MemoryHost`] implements [`HostRenderer`] over a plain node arena and logs
//! every call as a [`HostOp`]. It supports the inspection a headless embedder
//! or a test needs: markup serialization, text extraction, property and
//! listener lookup, and event dispatch.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use super::HostRenderer;
use crate::props::{Listener, NODE_VALUE, Value};

/// A handle to a node in a [`MemoryHost`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One logged host call.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    /// An element node was created.
    CreateNode {
        /// The new node.
        node: NodeId,
        /// Its kind.
        kind: String,
    },
    /// A text node was created.
    CreateText {
        /// The new node.
        node: NodeId,
    },
    /// A property was set.
    SetProperty {
        /// Target node.
        node: NodeId,
        /// Property name.
        name: String,
        /// New value.
        value: Value,
    },
    /// A property was cleared.
    ClearProperty {
        /// Target node.
        node: NodeId,
        /// Property name.
        name: String,
    },
    /// A listener was registered.
    AddListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
        /// [`Listener::id`] of the callback.
        listener: usize,
    },
    /// A listener was unregistered.
    RemoveListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
        /// [`Listener::id`] of the callback.
        listener: usize,
    },
    /// A node was appended to a parent.
    AppendChild {
        /// The parent.
        parent: NodeId,
        /// The appended node.
        child: NodeId,
    },
    /// A node was removed from a parent.
    RemoveChild {
        /// The parent.
        parent: NodeId,
        /// The removed node.
        child: NodeId,
    },
}

impl HostOp {
    /// Returns whether this call creates a node.
    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(self, Self::CreateNode { .. } | Self::CreateText { .. })
    }

    /// Returns whether this call changes tree structure.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::AppendChild { .. } | Self::RemoveChild { .. })
    }
}

#[derive(Debug)]
struct MemNode {
    /// `None` for text nodes.
    kind: Option<String>,
    properties: Vec<(String, Value)>,
    listeners: Vec<(String, Listener)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MemNode {
    fn new(kind: Option<String>) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An in-memory [`HostRenderer`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container node to render into. Not logged.
    pub fn create_container(&mut self) -> NodeId {
        self.push(MemNode::new(Some("root".into())))
    }

    /// Returns every logged call since creation or the last
    /// [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Drains the call log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        core::mem::take(&mut self.ops)
    }

    /// Returns the number of nodes ever created, containers included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the kind of an element node, or `None` for a text node.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<&str> {
        self.node(node).kind.as_deref()
    }

    /// Returns the parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Returns the children of a node in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Returns a property value.
    #[must_use]
    pub fn property(&self, node: NodeId, name: &str) -> Option<&Value> {
        self.node(node)
            .properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns how many listeners are registered for `event`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.node(node)
            .listeners
            .iter()
            .filter(|(e, _)| e == event)
            .count()
    }

    /// Invokes every listener registered for `event` on `node`, in
    /// registration order, and returns how many ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        let listeners: Vec<Listener> = self
            .node(node)
            .listeners
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &listeners {
            listener.call();
        }
        listeners.len()
    }

    /// Returns the first node of the given kind in pre-order below `root`
    /// (`root` included).
    #[must_use]
    pub fn find(&self, root: NodeId, kind: &str) -> Option<NodeId> {
        if self.kind(root) == Some(kind) {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|&child| self.find(child, kind))
    }

    /// Concatenates the content of every text node below `node`.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let n = self.node(node);
        if n.kind.is_none() {
            if let Some(value) = self.property(node, NODE_VALUE) {
                _ = write!(out, "{value}");
            }
            return;
        }
        for &child in &n.children {
            self.collect_text(child, out);
        }
    }

    /// Serializes `node` and its subtree as markup, e.g.
    /// `<h1 title="x">Count: 1</h1>`.
    #[must_use]
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Serializes only the children of `node`.
    #[must_use]
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let n = self.node(node);
        let Some(kind) = &n.kind else {
            if let Some(value) = self.property(node, NODE_VALUE) {
                _ = write!(out, "{value}");
            }
            return;
        };
        _ = write!(out, "<{kind}");
        for (name, value) in &n.properties {
            _ = write!(out, " {name}=\"{value}\"");
        }
        out.push('>');
        for &child in &n.children {
            self.write_markup(child, out);
        }
        _ = write!(out, "</{kind}>");
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "node counts stay far below u32::MAX"
    )]
    fn push(&mut self, node: MemNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, node: NodeId) -> &MemNode {
        self.nodes
            .get(node.0 as usize)
            .unwrap_or_else(|| panic!("unknown {node:?}"))
    }

    fn node_mut(&mut self, node: NodeId) -> &mut MemNode {
        self.nodes
            .get_mut(node.0 as usize)
            .unwrap_or_else(|| panic!("unknown {node:?}"))
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != child);
        }
    }
}

impl HostRenderer for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, kind: &str) -> NodeId {
        let node = self.push(MemNode::new(Some(kind.into())));
        self.ops.push(HostOp::CreateNode {
            node,
            kind: kind.into(),
        });
        node
    }

    fn create_text_node(&mut self) -> NodeId {
        let node = self.push(MemNode::new(None));
        self.ops.push(HostOp::CreateText { node });
        node
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: &Value) {
        let properties = &mut self.node_mut(*node).properties;
        match properties.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.clone(),
            None => properties.push((name.into(), value.clone())),
        }
        self.ops.push(HostOp::SetProperty {
            node: *node,
            name: name.into(),
            value: value.clone(),
        });
    }

    fn clear_property(&mut self, node: &NodeId, name: &str) {
        self.node_mut(*node).properties.retain(|(n, _)| n != name);
        self.ops.push(HostOp::ClearProperty {
            node: *node,
            name: name.into(),
        });
    }

    fn add_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) {
        self.node_mut(*node)
            .listeners
            .push((event.into(), listener.clone()));
        self.ops.push(HostOp::AddListener {
            node: *node,
            event: event.into(),
            listener: listener.id(),
        });
    }

    fn remove_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) {
        self.node_mut(*node)
            .listeners
            .retain(|(e, l)| !(e == event && l.same(listener)));
        self.ops.push(HostOp::RemoveListener {
            node: *node,
            event: event.into(),
            listener: listener.id(),
        });
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.detach(*child);
        self.node_mut(*parent).children.push(*child);
        self.node_mut(*child).parent = Some(*parent);
        self.ops.push(HostOp::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        assert_eq!(
            self.node(*child).parent,
            Some(*parent),
            "remove_child: {child:?} is not a child of {parent:?}"
        );
        self.detach(*child);
        self.ops.push(HostOp::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }

    fn is_container(&self, node: &NodeId) -> bool {
        self.nodes
            .get(node.0 as usize)
            .is_some_and(|n| n.kind.is_some())
    }
}
