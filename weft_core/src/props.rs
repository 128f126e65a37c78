// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed element properties and the property diff applied at commit.
//!
//! [`Props`] keeps three categories apart: plain attributes (`name → Value`),
//! event listeners (`event → Listener`) and children. Children are reserved;
//! they never reach the host as properties and never take part in a diff.
//!
//! String-keyed input goes through [`PropKey::classify`]: a key starting with
//! `on` names an event (the remainder, ASCII-lowercased, is the event name),
//! `children` is reserved, and everything else is an attribute.
//!
//! [`PropsPatch::between`] computes the minimal set of host calls that turns
//! one property set into another. The same comparison runs over attributes and
//! listeners; only the equality differs (value equality for attributes,
//! allocation identity for listeners).

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::element::Element;
use crate::host::HostRenderer;

/// The reserved property key holding child descriptions.
pub const CHILDREN: &str = "children";

/// The attribute carrying a text node's content.
pub const NODE_VALUE: &str = "nodeValue";

// ---------------------------------------------------------------------------
// Values and listeners
// ---------------------------------------------------------------------------

/// A plain property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string.
    Text(Cow<'static, str>),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Self::Text(Cow::Borrowed(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Cow::Owned(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A shared event callback.
///
/// Listener identity is the allocation: clones of one listener are the same
/// listener, while two listeners built from identical closures are not. Each
/// render that creates a fresh closure therefore produces a changed listener.
///
/// Callbacks take no arguments: hosts do not forward the native event object.
/// A listener that needs event data reads it from state it captured.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn()>);

impl Listener {
    /// Wraps a callback.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self) {
        (self.0)();
    }

    /// Returns whether `self` and `other` share one allocation.
    #[inline]
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a stable identity key for this listener, valid while any clone
    /// is alive. Hosts use it to find the native callback they registered.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:#x})", self.id())
    }
}

// ---------------------------------------------------------------------------
// Key classification
// ---------------------------------------------------------------------------

/// The category a string property key falls into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropKey {
    /// A plain attribute with the given name.
    Attribute(String),
    /// An event binding with the given normalized event name.
    Event(String),
    /// The reserved `children` key.
    Children,
}

impl PropKey {
    /// Classifies a string key.
    ///
    /// `onClick` becomes `Event("click")`, `children` is reserved, and every
    /// other key is an attribute.
    #[must_use]
    pub fn classify(key: &str) -> Self {
        if key == CHILDREN {
            Self::Children
        } else if let Some(event) = key.strip_prefix("on") {
            Self::Event(event.to_ascii_lowercase())
        } else {
            Self::Attribute(key.into())
        }
    }
}

/// A value for a string-keyed property entry.
#[derive(Clone, Debug)]
pub enum PropValue {
    /// A plain value.
    Value(Value),
    /// An event callback.
    Listener(Listener),
}

impl From<Value> for PropValue {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Listener> for PropValue {
    fn from(l: Listener) -> Self {
        Self::Listener(l)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

type Entries<V> = Vec<(Cow<'static, str>, V)>;

/// The property set of an element or fiber.
#[derive(Clone, Debug, Default)]
pub struct Props {
    attributes: Entries<Value>,
    listeners: Entries<Listener>,
    children: Vec<Element>,
}

impl Props {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a property set from string-keyed entries.
    ///
    /// Keys are classified with [`PropKey::classify`]. An entry whose value
    /// category does not match its key (a listener under an attribute key or
    /// the reverse) is dropped, as is anything under `children`.
    #[must_use]
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, PropValue)>,
    {
        let mut props = Self::new();
        for (key, value) in entries {
            match (PropKey::classify(key.as_ref()), value) {
                (PropKey::Attribute(name), PropValue::Value(v)) => {
                    props.set_attr(Cow::Owned(name), v);
                }
                (PropKey::Event(event), PropValue::Listener(l)) => {
                    props.set_listener(Cow::Owned(event), l);
                }
                _ => {}
            }
        }
        props
    }

    /// Sets an attribute, replacing any previous value under `name`.
    #[must_use]
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.set_attr(name.into(), value.into());
        self
    }

    /// Binds a listener to an event name (already normalized, e.g. `"click"`).
    #[must_use]
    pub fn on(mut self, event: impl Into<Cow<'static, str>>, listener: Listener) -> Self {
        self.set_listener(event.into(), listener);
        self
    }

    fn set_attr(&mut self, name: Cow<'static, str>, value: Value) {
        upsert(&mut self.attributes, name, value);
    }

    fn set_listener(&mut self, event: Cow<'static, str>, listener: Listener) {
        upsert(&mut self.listeners, event, listener);
    }

    /// Returns the attribute under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        lookup(&self.attributes, name)
    }

    /// Returns the listener bound to `event`.
    #[must_use]
    pub fn listener(&self, event: &str) -> Option<&Listener> {
        lookup(&self.listeners, event)
    }

    /// Iterates over `(name, value)` attribute pairs in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Iterates over `(event, listener)` pairs in insertion order.
    pub fn listeners(&self) -> impl Iterator<Item = (&str, &Listener)> {
        self.listeners.iter().map(|(k, l)| (k.as_ref(), l))
    }

    /// Returns the child descriptions.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    pub(crate) fn take_children(&mut self) -> Vec<Element> {
        core::mem::take(&mut self.children)
    }
}

fn upsert<V>(entries: &mut Entries<V>, key: Cow<'static, str>, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

fn lookup<'a, V>(entries: &'a Entries<V>, key: &str) -> Option<&'a V> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Host calls needed to move a node from one property set to another.
///
/// Apply order is fixed: removed listeners, cleared attributes, set
/// attributes, added listeners.
#[derive(Debug, Default)]
pub struct PropsPatch<'a> {
    /// Listeners that vanished or changed, with their old callback.
    pub removed_listeners: Vec<(&'a str, &'a Listener)>,
    /// Attributes present before and absent now.
    pub cleared: Vec<&'a str>,
    /// Attributes that are new or whose value changed.
    pub set: Vec<(&'a str, &'a Value)>,
    /// Listeners that are new or changed, with their new callback.
    pub added_listeners: Vec<(&'a str, &'a Listener)>,
}

impl<'a> PropsPatch<'a> {
    /// Computes the patch from `old` to `new`.
    #[must_use]
    pub fn between(old: &'a Props, new: &'a Props) -> Self {
        Self {
            removed_listeners: changed(&old.listeners, &new.listeners, Listener::same),
            cleared: changed(&old.attributes, &new.attributes, |_, _| true)
                .into_iter()
                .map(|(name, _)| name)
                .collect(),
            set: changed(&new.attributes, &old.attributes, Value::eq),
            added_listeners: changed(&new.listeners, &old.listeners, Listener::same),
        }
    }

    /// Computes the patch that applies `props` to a fresh node.
    #[must_use]
    pub fn initial(props: &'a Props) -> Self {
        Self {
            removed_listeners: Vec::new(),
            cleared: Vec::new(),
            set: props.attributes().collect(),
            added_listeners: props.listeners().collect(),
        }
    }

    /// Returns the number of host calls in this patch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removed_listeners.len() + self.cleared.len() + self.set.len() + self.added_listeners.len()
    }

    /// Returns `true` if applying the patch does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Issues the patch against `node`.
    pub fn apply<R: HostRenderer>(&self, host: &mut R, node: &R::Node) {
        for &(event, listener) in &self.removed_listeners {
            host.remove_listener(node, event, listener);
        }
        for &name in &self.cleared {
            host.clear_property(node, name);
        }
        for &(name, value) in &self.set {
            host.set_property(node, name, value);
        }
        for &(event, listener) in &self.added_listeners {
            host.add_listener(node, event, listener);
        }
    }
}

/// Entries of `from` that are missing from `to`, or present with a value that
/// `same` rejects.
fn changed<'a, V>(
    from: &'a Entries<V>,
    to: &'a Entries<V>,
    same: impl Fn(&V, &V) -> bool,
) -> Vec<(&'a str, &'a V)> {
    from.iter()
        .filter(|(key, value)| lookup(to, key).is_none_or(|other| !same(value, other)))
        .map(|(key, value)| (key.as_ref(), value))
        .collect()
}
