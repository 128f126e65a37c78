// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Same-level child reconciliation.
//!
//! New child descriptions are matched against the previous children of the
//! same position strictly by index. A position whose type is unchanged keeps
//! its host node and is tagged [`EffectTag::Update`]; anything else is a
//! [`EffectTag::Placement`] of a fresh fiber plus an [`EffectTag::Deletion`] of
//! the old one. There are no keys, so a moved child is observed as a delete
//! followed by a re-create.

use alloc::vec::Vec;

use crate::element::Element;
use crate::fiber::{EffectTag, FiberId, FiberKind, FiberStore, NewFiber};

/// Per-call counts returned by [`reconcile_children`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChildDiff {
    /// Positions kept with their host node.
    pub updates: u32,
    /// Fresh fibers created.
    pub placements: u32,
    /// Old fibers queued for deletion.
    pub deletions: u32,
}

/// Builds the child chain of `parent` from `elements`.
///
/// The previous children are read through `parent`'s alternate. Old fibers
/// that lose their position are tagged and appended to `deletions`.
pub(crate) fn reconcile_children<N: Clone>(
    fibers: &mut FiberStore<N>,
    deletions: &mut Vec<FiberId>,
    parent: FiberId,
    elements: Vec<Element>,
) -> ChildDiff {
    let mut diff = ChildDiff::default();
    let mut old = fibers
        .alternate(parent)
        .and_then(|alternate| fibers.first_child(alternate));
    let mut previous: Option<FiberId> = None;
    let mut elements = elements.into_iter();

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        let new_fiber = match (element, old) {
            (Some(element), Some(old_fiber)) if fibers.kind(old_fiber).matches(element.kind()) => {
                let (kind, props) = element.into_parts();
                let node = fibers.node(old_fiber).cloned();
                diff.updates += 1;
                Some(fibers.create(NewFiber {
                    kind: FiberKind::from(kind),
                    props,
                    node,
                    parent: Some(parent),
                    alternate: Some(old_fiber),
                    effect: Some(EffectTag::Update),
                }))
            }
            (element, old_fiber) => {
                if let Some(old_fiber) = old_fiber {
                    fibers.set_effect(old_fiber, EffectTag::Deletion);
                    deletions.push(old_fiber);
                    diff.deletions += 1;
                }
                element.map(|element| {
                    let (kind, props) = element.into_parts();
                    diff.placements += 1;
                    fibers.create(NewFiber {
                        kind: FiberKind::from(kind),
                        props,
                        node: None,
                        parent: Some(parent),
                        alternate: None,
                        effect: Some(EffectTag::Placement),
                    })
                })
            }
        };

        old = old.and_then(|old_fiber| fibers.next_sibling(old_fiber));

        if let Some(new_fiber) = new_fiber {
            match previous {
                None => fibers.set_first_child(parent, Some(new_fiber)),
                Some(prev) => fibers.set_next_sibling(prev, Some(new_fiber)),
            }
            previous = Some(new_fiber);
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Props;
    use alloc::vec;

    /// Creates a root fiber with `alternate` as its previous self.
    fn root(fibers: &mut FiberStore<u32>, alternate: Option<FiberId>) -> FiberId {
        fibers.create(NewFiber {
            kind: FiberKind::Root,
            props: Props::new(),
            node: Some(0),
            parent: None,
            alternate,
            effect: None,
        })
    }

    /// Reconciles, then gives every placed fiber a node so the next round can
    /// observe node reuse.
    fn settle(fibers: &mut FiberStore<u32>, parent: FiberId, elements: Vec<Element>) -> Vec<FiberId> {
        let mut deletions = Vec::new();
        reconcile_children(fibers, &mut deletions, parent, elements);
        let children: Vec<_> = fibers.children(parent).collect();
        for (i, &child) in children.iter().enumerate() {
            if fibers.node(child).is_none() {
                fibers.set_node(child, 100 + u32::try_from(i).unwrap());
            }
        }
        children
    }

    #[test]
    fn first_render_places_everything() {
        let mut fibers = FiberStore::new();
        let r = root(&mut fibers, None);
        let mut deletions = Vec::new();
        let diff = reconcile_children(
            &mut fibers,
            &mut deletions,
            r,
            vec![Element::host("a"), Element::text("b")],
        );
        assert_eq!(diff, ChildDiff { updates: 0, placements: 2, deletions: 0 });
        let kids: Vec<_> = fibers.children(r).collect();
        assert_eq!(kids.len(), 2);
        assert!(kids.iter().all(|&k| fibers.effect(k) == Some(EffectTag::Placement)));
        assert!(kids.iter().all(|&k| fibers.alternate(k).is_none()));
        assert_eq!(fibers.parent(kids[1]), Some(r));
    }

    #[test]
    fn same_types_update_and_keep_nodes() {
        let mut fibers = FiberStore::new();
        let old_root = root(&mut fibers, None);
        let old = settle(&mut fibers, old_root, vec![Element::host("a"), Element::host("b")]);

        let new_root = root(&mut fibers, Some(old_root));
        let mut deletions = Vec::new();
        let diff = reconcile_children(
            &mut fibers,
            &mut deletions,
            new_root,
            vec![Element::host("a"), Element::host("b")],
        );
        assert_eq!(diff, ChildDiff { updates: 2, placements: 0, deletions: 0 });
        assert!(deletions.is_empty());
        let kids: Vec<_> = fibers.children(new_root).collect();
        for (new, old) in kids.iter().zip(&old) {
            assert_eq!(fibers.effect(*new), Some(EffectTag::Update));
            assert_eq!(fibers.alternate(*new), Some(*old));
            assert_eq!(fibers.node(*new), fibers.node(*old));
        }
    }

    #[test]
    fn type_change_deletes_and_places_at_that_index() {
        let mut fibers = FiberStore::new();
        let old_root = root(&mut fibers, None);
        let old = settle(&mut fibers, old_root, vec![Element::host("a"), Element::host("b")]);

        let new_root = root(&mut fibers, Some(old_root));
        let mut deletions = Vec::new();
        let diff = reconcile_children(
            &mut fibers,
            &mut deletions,
            new_root,
            vec![Element::host("a"), Element::host("span")],
        );
        assert_eq!(diff, ChildDiff { updates: 1, placements: 1, deletions: 1 });
        assert_eq!(deletions, vec![old[1]]);
        assert_eq!(fibers.effect(old[1]), Some(EffectTag::Deletion));
        let kids: Vec<_> = fibers.children(new_root).collect();
        assert_eq!(fibers.effect(kids[1]), Some(EffectTag::Placement));
        assert_eq!(fibers.node(kids[1]), None, "type change never inherits a node");
    }

    #[test]
    fn shorter_list_deletes_the_tail() {
        let mut fibers = FiberStore::new();
        let old_root = root(&mut fibers, None);
        let old = settle(
            &mut fibers,
            old_root,
            vec![Element::host("a"), Element::host("b"), Element::host("c")],
        );

        let new_root = root(&mut fibers, Some(old_root));
        let mut deletions = Vec::new();
        let diff = reconcile_children(&mut fibers, &mut deletions, new_root, vec![Element::host("a")]);
        assert_eq!(diff.deletions, 2);
        assert_eq!(deletions, vec![old[1], old[2]]);
        assert_eq!(fibers.children(new_root).count(), 1);
    }

    #[test]
    fn moves_are_positional() {
        let mut fibers = FiberStore::new();
        let old_root = root(&mut fibers, None);
        settle(&mut fibers, old_root, vec![Element::host("a"), Element::text("x")]);

        let new_root = root(&mut fibers, Some(old_root));
        let mut deletions = Vec::new();
        let diff = reconcile_children(
            &mut fibers,
            &mut deletions,
            new_root,
            vec![Element::text("x"), Element::host("a")],
        );
        assert_eq!(diff, ChildDiff { updates: 0, placements: 2, deletions: 2 });
    }

    #[test]
    fn empty_to_empty_is_a_no_op() {
        let mut fibers = FiberStore::new();
        let r = root(&mut fibers, None);
        let mut deletions = Vec::new();
        let diff = reconcile_children(&mut fibers, &mut deletions, r, Vec::new());
        assert_eq!(diff, ChildDiff::default());
        assert_eq!(fibers.first_child(r), None);
    }
}
