// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element descriptions: the immutable input to a render.
//!
//! An [`Element`] names what should exist at one position of the output tree:
//! a host node kind, a text leaf, or a function [`Component`] that expands into
//! another element when rendered. Elements are cheap to clone (components and
//! listeners are shared) and are consumed by reconciliation.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::hooks::Hooks;
use crate::props::{NODE_VALUE, Props, Value};

/// What an element describes.
#[derive(Clone, Debug)]
pub enum ElementType {
    /// A host node of the named kind (e.g. `"div"`).
    Host(Cow<'static, str>),
    /// A text leaf; its content is the `nodeValue` attribute.
    Text,
    /// A function component.
    Component(Component),
}

impl ElementType {
    /// Returns whether two types denote the same kind of node, which is what
    /// lets reconciliation reuse a position instead of replacing it.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Text, Self::Text) => true,
            (Self::Component(a), Self::Component(b)) => a.same_type(b),
            _ => false,
        }
    }
}

impl From<&'static str> for ElementType {
    fn from(kind: &'static str) -> Self {
        Self::Host(Cow::Borrowed(kind))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

type RenderFn = dyn Fn(&mut Hooks<'_>, &Props) -> Element;

/// A plain function pointer usable as a render function.
pub type RenderPtr = fn(&mut Hooks<'_>, &Props) -> Element;

/// A function component.
///
/// Identity is the Rust type of the render function, so every `Component`
/// built from the same `fn` item (or the same closure expression) is the same
/// component type across renders. All function pointers share one type, so a
/// [`RenderPtr`] is additionally compared by address.
#[derive(Clone)]
pub struct Component {
    type_id: TypeId,
    pointer: Option<RenderPtr>,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    /// Wraps a render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    {
        let pointer = (&render as &dyn Any).downcast_ref::<RenderPtr>().copied();
        Self {
            type_id: TypeId::of::<F>(),
            pointer,
            name: core::any::type_name::<F>(),
            render: Rc::new(render),
        }
    }

    /// Returns the render function's type name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether both components come from the same render function.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && match (self.pointer, other.pointer) {
                (Some(a), Some(b)) => core::ptr::fn_addr_eq(a, b),
                _ => true,
            }
    }

    pub(crate) fn render(&self, hooks: &mut Hooks<'_>, props: &Props) -> Element {
        (self.render)(hooks, props)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// An immutable description of one node and its subtree.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementType,
    props: Props,
}

impl Element {
    /// Creates an element with no children.
    #[must_use]
    pub fn new(kind: impl Into<ElementType>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props,
        }
    }

    /// Creates a host element with no properties.
    #[must_use]
    pub fn host(kind: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ElementType::Host(kind.into()), Props::new())
    }

    /// Creates a text leaf.
    #[must_use]
    pub fn text(value: impl Into<Value>) -> Self {
        Self::new(ElementType::Text, Props::new().attr(NODE_VALUE, value))
    }

    /// Creates a component element.
    #[must_use]
    pub fn component<F>(render: F, props: Props) -> Self
    where
        F: Fn(&mut Hooks<'_>, &Props) -> Element + 'static,
    {
        Self::new(Component::new(render), props)
    }

    /// Appends a child, converting primitives into text leaves.
    #[must_use]
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        let mut children = self.props.take_children();
        children.push(child.into().into_element());
        self.props.set_children(children);
        self
    }

    /// Returns the element type.
    #[must_use]
    pub fn kind(&self) -> &ElementType {
        &self.kind
    }

    /// Returns the properties, children included.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn into_parts(self) -> (ElementType, Props) {
        (self.kind, self.props)
    }
}

/// A child passed to [`build`]: either a full element or a raw value that
/// becomes a text leaf.
#[derive(Clone, Debug)]
pub enum Child {
    /// A nested element.
    Element(Element),
    /// A raw value.
    Value(Value),
}

impl Child {
    fn into_element(self) -> Element {
        match self {
            Self::Element(element) => element,
            Self::Value(value) => Element::text(value),
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! child_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

child_from_value!(&'static str, alloc::string::String, i64, i32, u32, f64, bool);

/// Builds an element from a type, properties and children.
///
/// Children that are not elements become text leaves carrying the raw value.
#[must_use]
pub fn build(
    kind: impl Into<ElementType>,
    mut props: Props,
    children: impl IntoIterator<Item = Child>,
) -> Element {
    let children: Vec<Element> = children.into_iter().map(Child::into_element).collect();
    props.set_children(children);
    Element::new(kind, props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn greeting(_: &mut Hooks<'_>, _: &Props) -> Element {
        Element::host("p")
    }

    fn farewell(_: &mut Hooks<'_>, _: &Props) -> Element {
        Element::host("span")
    }

    #[test]
    fn primitive_children_become_text_leaves() {
        let h1 = build("h1", Props::new(), vec!["Count: ".into(), 1.into()]);
        let children = h1.props().children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0].kind(), ElementType::Text));
        assert_eq!(children[0].props().get(NODE_VALUE), Some(&Value::from("Count: ")));
        assert_eq!(children[1].props().get(NODE_VALUE), Some(&Value::Int(1)));
        assert!(children[1].props().children().is_empty());
    }

    #[test]
    fn element_children_are_kept() {
        let list = build("ul", Props::new(), vec![Element::host("li").into()]);
        assert!(matches!(
            list.props().children()[0].kind(),
            ElementType::Host(kind) if kind == "li"
        ));
    }

    #[test]
    fn child_builder_matches_build() {
        let a = Element::host("h1").child("x").child(2);
        assert_eq!(a.props().children().len(), 2);
        assert!(a.kind().same_type(&ElementType::from("h1")));
    }

    #[test]
    fn host_types_compare_by_name() {
        assert!(ElementType::from("div").same_type(&ElementType::Host("div".into())));
        assert!(!ElementType::from("div").same_type(&ElementType::from("span")));
        assert!(!ElementType::from("div").same_type(&ElementType::Text));
    }

    #[test]
    fn components_compare_by_render_function() {
        let a = ElementType::from(Component::new(greeting));
        let b = ElementType::from(Component::new(greeting));
        let c = ElementType::from(Component::new(farewell));
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
        assert!(!a.same_type(&ElementType::from("p")));
    }

    #[test]
    fn function_pointers_compare_by_address() {
        let table: [RenderPtr; 2] = [greeting, farewell];
        let a = Component::new(table[0]);
        let b = Component::new(table[1]);
        assert!(a.same_type(&Component::new(table[0])));
        assert!(!a.same_type(&b));
        assert!(!a.same_type(&Component::new(greeting)), "fn item and pointer differ");
    }
}
