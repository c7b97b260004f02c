// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure, capacity parameters, and the pruned visitor traversal.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::domain::{Bounded, Domain};

/// Upper bound on tree height, sized so a `u64` level mask covers every
/// level during an insertion.
pub const MAX_DEPTH: usize = 63;

/// Capacity and rebalancing parameters, fixed per tree.
///
/// Leaf and inner levels are configured independently. Each level carries a
/// capacity, a minimum fill for non-root nodes, and the number of entries
/// evicted by one forced-reinsertion pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub(crate) leaf_cap: usize,
    pub(crate) leaf_min: usize,
    pub(crate) leaf_reinsert: usize,
    pub(crate) inner_cap: usize,
    pub(crate) inner_min: usize,
    pub(crate) inner_reinsert: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl Params {
    /// The default parameters: capacity 64 at both levels, minimum fill and
    /// reinsertion count a third of the capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters with the given capacity at both levels and the
    /// third-of-capacity minimum fill and reinsertion count.
    pub fn with_capacity(cap: usize) -> Self {
        let third = (cap / 3).max(1);
        Self::check(cap, third, third);
        Self {
            leaf_cap: cap,
            leaf_min: third,
            leaf_reinsert: third,
            inner_cap: cap,
            inner_min: third,
            inner_reinsert: third,
        }
    }

    /// Set leaf capacity, minimum fill, and reinsertion count.
    pub fn leaf(mut self, cap: usize, min: usize, reinsert: usize) -> Self {
        Self::check(cap, min, reinsert);
        self.leaf_cap = cap;
        self.leaf_min = min;
        self.leaf_reinsert = reinsert;
        self
    }

    /// Set inner-node capacity, minimum fill, and reinsertion count.
    pub fn inner(mut self, cap: usize, min: usize, reinsert: usize) -> Self {
        Self::check(cap, min, reinsert);
        self.inner_cap = cap;
        self.inner_min = min;
        self.inner_reinsert = reinsert;
        self
    }

    fn check(cap: usize, min: usize, reinsert: usize) {
        assert!(min >= 1, "non-root nodes must not be empty");
        // Guarantees a legal split index exists for cap + 1 entries, and that
        // nodes can hold at least 3 entries.
        assert!(min < cap / 2, "minimum fill must be below half the capacity");
        assert!(
            reinsert >= 1 && reinsert <= cap - min + 1,
            "reinsertion must evict at least one entry and keep the minimum fill"
        );
    }
}

/// Node content: a leaf holds items, an inner node holds child nodes.
pub(crate) enum Kind<T, D: Domain> {
    Leaf(Vec<T>),
    Inner(Vec<Node<T, D>>),
}

/// A tree node with its cached bounding rectangle.
///
/// `rect` is derived state: it is exactly the union of the contents'
/// rectangles, re-derived by the insertion machinery whenever the content
/// set changes.
pub(crate) struct Node<T, D: Domain> {
    pub(crate) rect: D::Rect,
    pub(crate) kind: Kind<T, D>,
}

#[cfg(test)]
impl<T, D: Domain> Node<T, D> {
    pub(crate) fn len(&self) -> usize {
        match &self.kind {
            Kind::Leaf(items) => items.len(),
            Kind::Inner(children) => children.len(),
        }
    }
}

/// Error returned when a root split would exceed [`MAX_DEPTH`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded;

impl core::fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "maximum tree depth ({MAX_DEPTH}) exceeded")
    }
}

impl core::error::Error for DepthExceeded {}

/// A bounding-rectangle tree (R*-tree) over items with derivable rectangles.
///
/// The tree owns its nodes exclusively in a strict tree shape. Insertion and
/// traversal are synchronous and single-threaded; concurrent use must be
/// serialized externally.
pub struct RTree<T, D: Domain> {
    pub(crate) domain: D,
    pub(crate) params: Params,
    pub(crate) root: Option<Node<T, D>>,
    pub(crate) depth: usize,
    pub(crate) len: usize,
}

impl<T, D: Domain> Debug for RTree<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("len", &self.len)
            .field("depth", &self.depth)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<T: Bounded<D>, D: Domain + Default> Default for RTree<T, D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<T: Bounded<D>, D: Domain> RTree<T, D> {
    /// Create an empty tree for the given domain with default [`Params`].
    pub fn new(domain: D) -> Self {
        Self::with_params(domain, Params::default())
    }

    /// Create an empty tree with explicit parameters.
    pub fn with_params(domain: D, params: Params) -> Self {
        Self {
            domain,
            params,
            root: None,
            depth: 0,
            len: 0,
        }
    }

    /// The domain this tree was built with.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Number of levels above the leaves; 0 means the root is itself a leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every node and reset to the empty state.
    pub fn clear(&mut self) {
        self.root = None;
        self.depth = 0;
        self.len = 0;
    }

    /// Pruned, depth-first, pre-order traversal.
    ///
    /// `check` runs first at every node with the node's cached rectangle and
    /// level (0 = leaf); returning `false` prunes the whole subtree. At a
    /// leaf whose check passed, `visit` receives every item in storage
    /// order; returning `false` terminates the entire traversal immediately,
    /// enabling first-match searches.
    ///
    /// The traversal is strictly sequential, so the two callbacks may share
    /// mutable external state (a running "best so far" for nearest-neighbor
    /// or ray searches) through a [`core::cell::Cell`] or similar.
    pub fn visit<C, V>(&self, mut check: C, mut visit: V)
    where
        C: FnMut(&D::Rect, usize) -> bool,
        V: FnMut(&T) -> bool,
    {
        if let Some(root) = &self.root {
            let _ = visit_node(root, self.depth, &mut check, &mut visit);
        }
    }
}

fn visit_node<T, D, C, V>(node: &Node<T, D>, level: usize, check: &mut C, visit: &mut V) -> bool
where
    D: Domain,
    C: FnMut(&D::Rect, usize) -> bool,
    V: FnMut(&T) -> bool,
{
    if !check(&node.rect, level) {
        return true;
    }
    match &node.kind {
        Kind::Leaf(items) => {
            for item in items {
                if !visit(item) {
                    return false;
                }
            }
        }
        Kind::Inner(children) => {
            for child in children {
                if !visit_node(child, level - 1, check, visit) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
impl<T: Bounded<D>, D: Domain> RTree<T, D>
where
    D::Rect: PartialEq,
{
    /// Walk the whole tree and assert the structural invariants: fill
    /// bounds, exact cached rectangles, uniform leaf depth, item count.
    pub(crate) fn assert_invariants(&self) {
        let Some(root) = &self.root else {
            assert_eq!(self.depth, 0, "empty tree must have depth 0");
            assert_eq!(self.len, 0, "empty tree must have no items");
            return;
        };
        let counted = check_node(&self.domain, &self.params, root, self.depth, true);
        assert_eq!(counted, self.len, "stored item count must match len()");
    }
}

#[cfg(test)]
fn check_node<T: Bounded<D>, D: Domain>(
    domain: &D,
    params: &Params,
    node: &Node<T, D>,
    level: usize,
    is_root: bool,
) -> usize
where
    D::Rect: PartialEq,
{
    let (cap, min) = if level == 0 {
        (params.leaf_cap, params.leaf_min)
    } else {
        (params.inner_cap, params.inner_min)
    };
    assert!(node.len() <= cap, "node above capacity");
    if !is_root {
        assert!(node.len() >= min, "non-root node below minimum fill");
    }
    match &node.kind {
        Kind::Leaf(items) => {
            assert_eq!(level, 0, "leaf above level 0");
            let mut it = items.iter();
            let mut rect = it.next().expect("empty leaf").rect(domain);
            for item in it {
                rect = domain.union(&rect, &item.rect(domain));
            }
            assert!(rect == node.rect, "stale cached leaf rectangle");
            items.len()
        }
        Kind::Inner(children) => {
            assert!(level > 0, "inner node at leaf level");
            let mut count = 0;
            let mut it = children.iter();
            let first = it.next().expect("empty inner node");
            let mut rect = first.rect;
            for child in it {
                rect = domain.union(&rect, &child.rect);
            }
            assert!(rect == node.rect, "stale cached inner rectangle");
            for child in children {
                count += check_node(domain, params, child, level - 1, false);
            }
            count
        }
    }
}
