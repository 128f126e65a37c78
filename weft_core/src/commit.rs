// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase: flushing a finished tree to the host in one pass.
//!
//! Deletions go first, then the new tree is visited in depth-first pre-order.
//! Placed nodes are appended under their nearest host-backed ancestor and
//! updated nodes receive the property diff against their alternate. Nothing
//! here yields; the host sees either the previous tree or the new one.

use crate::fiber::{EffectTag, FiberId, FiberStore};
use crate::host::HostRenderer;
use crate::props::PropsPatch;

/// Counts from one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Fibers tagged [`EffectTag::Placement`].
    pub placements: u32,
    /// Fibers tagged [`EffectTag::Update`].
    pub updates: u32,
    /// Fibers in the deletion set.
    pub deletions: u32,
    /// Host nodes detached by deletions.
    pub removed_nodes: u32,
    /// Property and listener calls issued by updates.
    pub property_mutations: u32,
}

/// Applies the effects of the tree under `root` and the pending `deletions`.
///
/// # Panics
///
/// Panics if a deleted fiber has no host-backed ancestor, or if a host-backed
/// fiber reaches commit without a host node.
pub(crate) fn commit_root<R: HostRenderer>(
    host: &mut R,
    fibers: &FiberStore<R::Node>,
    root: FiberId,
    deletions: &[FiberId],
) -> CommitStats {
    let mut stats = CommitStats::default();

    for &fiber in deletions {
        let parent = host_parent(fibers, fiber);
        commit_deletion(host, fibers, fiber, parent, &mut stats);
        stats.deletions += 1;
    }

    for fiber in fibers.descendants(root).skip(1) {
        let Some(effect) = fibers.effect(fiber) else {
            continue;
        };
        let node = fibers.node(fiber);
        assert!(
            node.is_some() || !fibers.kind(fiber).is_host_backed(),
            "host-backed fiber {fiber:?} reached commit without a host node"
        );
        match effect {
            EffectTag::Placement => {
                if let Some(node) = node {
                    host.append_child(host_parent(fibers, fiber), node);
                }
                stats.placements += 1;
            }
            EffectTag::Update => {
                if let Some(node) = node {
                    let alternate = fibers
                        .alternate(fiber)
                        .unwrap_or_else(|| panic!("updated fiber {fiber:?} has no alternate"));
                    let patch = PropsPatch::between(fibers.props(alternate), fibers.props(fiber));
                    stats.property_mutations = stats
                        .property_mutations
                        .saturating_add(u32::try_from(patch.len()).unwrap_or(u32::MAX));
                    patch.apply(host, node);
                }
                stats.updates += 1;
            }
            EffectTag::Deletion => {}
        }
    }

    stats
}

/// Removes the host nodes of `fiber`'s subtree from `parent`. A fiber without
/// a node (a component) hands the job to its children.
fn commit_deletion<R: HostRenderer>(
    host: &mut R,
    fibers: &FiberStore<R::Node>,
    fiber: FiberId,
    parent: &R::Node,
    stats: &mut CommitStats,
) {
    match fibers.node(fiber) {
        Some(node) => {
            host.remove_child(parent, node);
            stats.removed_nodes += 1;
        }
        None => {
            for child in fibers.children(fiber) {
                commit_deletion(host, fibers, child, parent, stats);
            }
        }
    }
}

fn host_parent<N>(fibers: &FiberStore<N>, fiber: FiberId) -> &N {
    fibers
        .host_ancestor(fiber)
        .and_then(|ancestor| fibers.node(ancestor))
        .unwrap_or_else(|| panic!("fiber {fiber:?} has no host-backed ancestor"))
}
