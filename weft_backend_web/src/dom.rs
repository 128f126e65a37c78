// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM host renderer.
//!
//! [`DomRenderer`] implements [`HostRenderer`] over [`web_sys::Node`]. Every
//! property, `nodeValue` included, is assigned on the node object itself
//! (`node[name] = value`), so keys such as `value`, `checked` or `className`
//! reach the live DOM state rather than the markup attribute. Clearing a
//! property assigns the empty string. Each listener is wrapped in a JS closure
//! that stays alive until the listener is removed.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::Reflect;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Node};
use weft_core::host::HostRenderer;
use weft_core::props::{Listener, Value};

/// A property value as assigned to a DOM node.
#[derive(Clone, Debug, PartialEq)]
enum DomValue<'a> {
    Str(&'a str),
    Number(f64),
    Bool(bool),
}

impl<'a> DomValue<'a> {
    /// The value assigned when a property goes away.
    const CLEARED: Self = Self::Str("");

    fn of(value: &'a Value) -> Self {
        match value {
            Value::Text(s) => Self::Str(s),
            Value::Int(n) => Self::Number(*n as f64),
            Value::Float(x) => Self::Number(*x),
            Value::Bool(b) => Self::Bool(*b),
        }
    }

    fn to_js(&self) -> JsValue {
        match self {
            Self::Str(s) => JsValue::from_str(s),
            Self::Number(x) => JsValue::from_f64(*x),
            Self::Bool(b) => JsValue::from_bool(*b),
        }
    }
}

fn assign(node: &Node, name: &str, value: &DomValue<'_>) {
    let _ = Reflect::set(node, &JsValue::from_str(name), &value.to_js());
}

struct Registration {
    node: Node,
    event: String,
    listener: usize,
    closure: Closure<dyn Fn()>,
}

/// Drives a browser DOM subtree.
pub struct DomRenderer {
    document: Document,
    registrations: Vec<Registration>,
}

impl core::fmt::Debug for DomRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomRenderer")
            .field("document", &"Document")
            .field("listeners", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

impl DomRenderer {
    /// Creates a renderer that creates nodes in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            registrations: Vec::new(),
        }
    }

    /// Returns the document nodes are created in.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the number of live listener registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }
}

impl HostRenderer for DomRenderer {
    type Node = Node;

    fn create_node(&mut self, kind: &str) -> Node {
        self.document
            .create_element(kind)
            .expect("create_element failed")
            .into()
    }

    fn create_text_node(&mut self) -> Node {
        self.document.create_text_node("").into()
    }

    fn set_property(&mut self, node: &Node, name: &str, value: &Value) {
        assign(node, name, &DomValue::of(value));
    }

    fn clear_property(&mut self, node: &Node, name: &str) {
        assign(node, name, &DomValue::CLEARED);
    }

    fn add_listener(&mut self, node: &Node, event: &str, listener: &Listener) {
        let callback = listener.clone();
        let closure = Closure::wrap(Box::new(move || callback.call()) as Box<dyn Fn()>);
        let _ = node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        self.registrations.push(Registration {
            node: node.clone(),
            event: event.into(),
            listener: listener.id(),
            closure,
        });
    }

    fn remove_listener(&mut self, node: &Node, event: &str, listener: &Listener) {
        let id = listener.id();
        let Some(pos) = self
            .registrations
            .iter()
            .position(|r| r.listener == id && r.event == event && r.node == *node)
        else {
            return;
        };
        let registration = self.registrations.swap_remove(pos);
        let _ = node.remove_event_listener_with_callback(
            event,
            registration.closure.as_ref().unchecked_ref(),
        );
    }

    fn append_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.append_child(child);
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.remove_child(child);
        // Listeners below a detached node can never fire again.
        self.registrations
            .retain(|r| r.node != *child && !child.contains(Some(&r.node)));
    }

    fn is_container(&self, node: &Node) -> bool {
        node.dyn_ref::<Element>().is_some()
    }
}
