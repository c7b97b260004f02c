// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R*-tree insertion: subtree choice, forced reinsertion, and node splits.
//!
//! Insertion has two layers of recursion: the tree descent, and reinsertion
//! (one reinsertion may lead to another). The descent returns completely
//! before any evicted entry is re-driven from the root, which keeps stack
//! growth linear in the tree depth and lets evicted entries land in an
//! entirely different subtree. All cascaded reinsertions of one top-level
//! insert share one level mask recording where reinsertion already ran.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::domain::{Bounded, Domain, Measure, Scalar};
use crate::tree::{DepthExceeded, Kind, MAX_DEPTH, Node, Params, RTree};

/// Outcome of one level of descent, reported to the caller one level up.
enum InsertionResult<T, D: Domain> {
    /// Inserted with capacity headroom; the caller's eager rectangle
    /// enlargement already covers it.
    Complete,
    /// A node below shed entries via forced reinsertion; the caller must
    /// re-derive its cached rectangle, which may have shrunk.
    Reinserted,
    /// The level below overflowed a second time and produced a sibling; the
    /// caller must adopt it, which may overflow the caller itself.
    Split(Node<T, D>),
}

/// Call-scoped insertion state.
///
/// `tried` holds one bit per level, set when forced reinsertion runs there;
/// a second overflow at a marked level must split instead. Evicted entries
/// queue here until the triggering descent has fully unwound, then re-enter
/// from the root as ordinary insertions.
struct ReinsertState<T, D: Domain> {
    tried: u64,
    items: Vec<T>,
    /// Evicted subtrees, each with the level of the parent it must rejoin.
    subtrees: Vec<(Node<T, D>, usize)>,
}

impl<T, D: Domain> ReinsertState<T, D> {
    fn new() -> Self {
        Self {
            tried: 0,
            items: Vec::new(),
            subtrees: Vec::new(),
        }
    }

    fn tried(&self, level: usize) -> bool {
        self.tried & (1 << level) != 0
    }

    fn mark(&mut self, level: usize) {
        self.tried |= 1 << level;
    }
}

/// Borrowed view of a tree's immutable parts, threaded down the descent
/// together with the call-scoped state.
struct Inserter<'a, T, D: Domain> {
    domain: &'a D,
    params: &'a Params,
    state: &'a mut ReinsertState<T, D>,
}

impl<T: Bounded<D>, D: Domain> RTree<T, D> {
    /// Insert an item.
    ///
    /// The only failure is a root split past [`MAX_DEPTH`]; every other
    /// insertion succeeds and leaves all structural invariants intact.
    pub fn insert(&mut self, item: T) -> Result<(), DepthExceeded> {
        let mut state = ReinsertState::new();
        self.insert_from_root(item, &mut state)?;
        self.len += 1;
        // Evicted entries re-enter from the root only now, after the
        // triggering descent has fully unwound. Re-driving them may evict
        // more entries at other levels; the shared mask bounds the cascade.
        loop {
            if let Some((node, at_level)) = state.subtrees.pop() {
                self.reinsert_subtree(node, at_level, &mut state)?;
            } else if let Some(item) = state.items.pop() {
                self.insert_from_root(item, &mut state)?;
            } else {
                return Ok(());
            }
        }
    }

    fn insert_from_root(
        &mut self,
        item: T,
        state: &mut ReinsertState<T, D>,
    ) -> Result<(), DepthExceeded> {
        let rect = item.rect(&self.domain);
        let Some(root) = self.root.as_mut() else {
            let mut items = Vec::with_capacity(self.params.leaf_cap + 1);
            items.push(item);
            self.root = Some(Node {
                rect,
                kind: Kind::Leaf(items),
            });
            return Ok(());
        };
        let mut inserter = Inserter {
            domain: &self.domain,
            params: &self.params,
            state,
        };
        let result = inserter.descend_item(root, self.depth, item, &rect);
        self.resolve_root(result)
    }

    fn reinsert_subtree(
        &mut self,
        ins: Node<T, D>,
        at_level: usize,
        state: &mut ReinsertState<T, D>,
    ) -> Result<(), DepthExceeded> {
        let depth = self.depth;
        let root = self.root.as_mut().expect("evictions from an empty tree");
        let mut inserter = Inserter {
            domain: &self.domain,
            params: &self.params,
            state,
        };
        let result = inserter.descend_subtree(root, depth, ins, at_level);
        self.resolve_root(result)
    }

    fn resolve_root(&mut self, result: InsertionResult<T, D>) -> Result<(), DepthExceeded> {
        match result {
            InsertionResult::Complete | InsertionResult::Reinserted => Ok(()),
            InsertionResult::Split(sibling) => self.grow_root(sibling),
        }
    }

    /// Grow the tree one level: a fresh root adopts the former root and the
    /// split sibling as its only children.
    fn grow_root(&mut self, sibling: Node<T, D>) -> Result<(), DepthExceeded> {
        if self.depth == MAX_DEPTH {
            // The sibling subtree is dropped here; the surviving tree keeps
            // its invariants.
            return Err(DepthExceeded);
        }
        let old = self.root.take().expect("split of an empty tree");
        let rect = self.domain.union(&old.rect, &sibling.rect);
        let mut children = Vec::with_capacity(self.params.inner_cap + 1);
        children.push(old);
        children.push(sibling);
        self.root = Some(Node {
            rect,
            kind: Kind::Inner(children),
        });
        self.depth += 1;
        Ok(())
    }
}

impl<T: Bounded<D>, D: Domain> Inserter<'_, T, D> {
    fn descend_item(
        &mut self,
        node: &mut Node<T, D>,
        level: usize,
        item: T,
        rect: &D::Rect,
    ) -> InsertionResult<T, D> {
        let domain = self.domain;
        // Eager enlargement: always correct, and avoids a second bottom-up
        // pass on the common path. Overflow handling re-derives it.
        node.rect = domain.union(&node.rect, rect);
        let sibling = match &mut node.kind {
            Kind::Leaf(items) => {
                items.push(item);
                if items.len() <= self.params.leaf_cap {
                    return InsertionResult::Complete;
                }
                if !self.state.tried(0) {
                    self.state.mark(0);
                    let center = domain.center(&node.rect);
                    let evicted = evict_farthest(
                        domain,
                        items,
                        self.params.leaf_reinsert,
                        &center,
                        |item: &T| item.rect(domain),
                    );
                    self.state.items.extend(evicted);
                    node.rect = bound_items(domain, items);
                    return InsertionResult::Reinserted;
                }
                // Reinsertion already ran at the leaf level this call.
                let split_at =
                    compute_split(domain, items, self.params.leaf_min, |item: &T| {
                        item.rect(domain)
                    });
                let tail = items.split_off(split_at);
                node.rect = bound_items(domain, items);
                let rect = bound_items(domain, &tail);
                return InsertionResult::Split(Node {
                    rect,
                    kind: Kind::Leaf(tail),
                });
            }
            Kind::Inner(children) => {
                let child = choose_subtree(domain, children, rect);
                match self.descend_item(&mut children[child], level - 1, item, rect) {
                    InsertionResult::Complete => return InsertionResult::Complete,
                    InsertionResult::Reinserted => {
                        node.rect = bound_children(domain, children);
                        return InsertionResult::Reinserted;
                    }
                    InsertionResult::Split(sibling) => sibling,
                }
            }
        };
        self.adopt_child(node, level, sibling)
    }

    /// Re-attach an evicted subtree as a child of a node at `at_level`.
    fn descend_subtree(
        &mut self,
        node: &mut Node<T, D>,
        level: usize,
        ins: Node<T, D>,
        at_level: usize,
    ) -> InsertionResult<T, D> {
        let domain = self.domain;
        node.rect = domain.union(&node.rect, &ins.rect);
        if level == at_level {
            return self.adopt_child(node, level, ins);
        }
        let sibling = {
            let Kind::Inner(children) = &mut node.kind else {
                unreachable!()
            };
            let child = choose_subtree(domain, children, &ins.rect);
            match self.descend_subtree(&mut children[child], level - 1, ins, at_level) {
                InsertionResult::Complete => return InsertionResult::Complete,
                InsertionResult::Reinserted => {
                    node.rect = bound_children(domain, children);
                    return InsertionResult::Reinserted;
                }
                InsertionResult::Split(sibling) => sibling,
            }
        };
        self.adopt_child(node, level, sibling)
    }

    /// Add one more child to an inner node, resolving an overflow by forced
    /// reinsertion (once per level per call) or by splitting.
    fn adopt_child(
        &mut self,
        node: &mut Node<T, D>,
        level: usize,
        child: Node<T, D>,
    ) -> InsertionResult<T, D> {
        let domain = self.domain;
        let Kind::Inner(children) = &mut node.kind else {
            unreachable!()
        };
        children.push(child);
        if children.len() <= self.params.inner_cap {
            return InsertionResult::Complete;
        }
        if !self.state.tried(level) {
            self.state.mark(level);
            let center = domain.center(&node.rect);
            let evicted = evict_farthest(
                domain,
                children,
                self.params.inner_reinsert,
                &center,
                |child: &Node<T, D>| child.rect,
            );
            self.state
                .subtrees
                .extend(evicted.into_iter().map(|node| (node, level)));
            node.rect = bound_children(domain, children);
            return InsertionResult::Reinserted;
        }
        let split_at = compute_split(domain, children, self.params.inner_min, |child: &Node<T, D>| {
            child.rect
        });
        let tail = children.split_off(split_at);
        node.rect = bound_children(domain, children);
        let rect = bound_children(domain, &tail);
        InsertionResult::Split(Node {
            rect,
            kind: Kind::Inner(tail),
        })
    }
}

/// The child whose rectangle needs the least area enlargement to cover
/// `rect`, ties broken by the smaller resulting area. Used uniformly at
/// every inner level.
fn choose_subtree<T, D: Domain>(domain: &D, children: &[Node<T, D>], rect: &D::Rect) -> usize {
    let mut best = 0;
    let mut best_key: Option<(Measure<D>, Measure<D>)> = None;
    for (i, child) in children.iter().enumerate() {
        let area = domain.area(&child.rect);
        let enlargement = domain.area(&domain.union(&child.rect, rect)) - area;
        let key = (enlargement, area);
        if best_key.map(|b| key < b).unwrap_or(true) {
            best_key = Some(key);
            best = i;
        }
    }
    best
}

/// Sort entries by ascending distance of their centers from `center` and
/// split off the farthest `count` for reinsertion.
fn evict_farthest<E, D, F>(
    domain: &D,
    entries: &mut Vec<E>,
    count: usize,
    center: &D::Point,
    rect_of: F,
) -> Vec<E>
where
    D: Domain,
    F: Fn(&E) -> D::Rect,
{
    entries.sort_by(|a, b| {
        let da = domain.dist_sq(&domain.center(&rect_of(a)), center);
        let db = domain.dist_sq(&domain.center(&rect_of(b)), center);
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    });
    entries.split_off(entries.len() - count)
}

/// Pick the split axis and point for an overfull entry set.
///
/// Reorders `entries` along the chosen axis and returns the index of the
/// first entry of the second group. The axis is the one with the least sum
/// of group margins over every distribution keeping both groups at `min`;
/// the split point minimizes group overlap, then combined area.
fn compute_split<E, D, F>(domain: &D, entries: &mut [E], min: usize, rect_of: F) -> usize
where
    D: Domain,
    F: Fn(&E) -> D::Rect,
{
    let total = entries.len();
    debug_assert!(total >= 2 * min, "no legal split point");
    let mut prefix: Vec<D::Rect> = Vec::with_capacity(total);
    let mut suffix: Vec<D::Rect> = Vec::with_capacity(total);

    let mut best_axis = 0;
    let mut best_margin: Option<Measure<D>> = None;
    for axis in 0..D::DIM {
        entries.sort_by(|a, b| domain.axis_cmp(axis, &rect_of(a), &rect_of(b)));
        running_bounds(domain, entries, &rect_of, &mut prefix, &mut suffix);
        let mut margin_sum = <D::Scalar as Scalar>::acc_zero();
        for split in min..=(total - min) {
            margin_sum =
                margin_sum + domain.margin(&prefix[split - 1]) + domain.margin(&suffix[split]);
        }
        if best_margin.map(|b| margin_sum < b).unwrap_or(true) {
            best_margin = Some(margin_sum);
            best_axis = axis;
        }
    }

    entries.sort_by(|a, b| domain.axis_cmp(best_axis, &rect_of(a), &rect_of(b)));
    running_bounds(domain, entries, &rect_of, &mut prefix, &mut suffix);
    let mut best_split = min;
    let mut best_key: Option<(Measure<D>, Measure<D>)> = None;
    for split in min..=(total - min) {
        let first = &prefix[split - 1];
        let second = &suffix[split];
        let overlap = domain
            .intersect(first, second)
            .map(|r| domain.area(&r))
            .unwrap_or_else(<D::Scalar as Scalar>::acc_zero);
        let key = (overlap, domain.area(first) + domain.area(second));
        if best_key.map(|b| key < b).unwrap_or(true) {
            best_key = Some(key);
            best_split = split;
        }
    }
    best_split
}

/// Fill `prefix[i]` with the union of `entries[..=i]` and `suffix[i]` with
/// the union of `entries[i..]`, so every candidate split is scored in O(1).
fn running_bounds<E, D, F>(
    domain: &D,
    entries: &[E],
    rect_of: &F,
    prefix: &mut Vec<D::Rect>,
    suffix: &mut Vec<D::Rect>,
) where
    D: Domain,
    F: Fn(&E) -> D::Rect,
{
    prefix.clear();
    suffix.clear();
    let mut acc = rect_of(&entries[0]);
    prefix.push(acc);
    for entry in &entries[1..] {
        acc = domain.union(&acc, &rect_of(entry));
        prefix.push(acc);
    }
    let mut acc = rect_of(&entries[entries.len() - 1]);
    suffix.push(acc);
    for entry in entries[..entries.len() - 1].iter().rev() {
        acc = domain.union(&rect_of(entry), &acc);
        suffix.push(acc);
    }
    suffix.reverse();
}

fn bound_items<T: Bounded<D>, D: Domain>(domain: &D, items: &[T]) -> D::Rect {
    let (first, rest) = items.split_first().expect("bounding an empty leaf");
    let mut rect = first.rect(domain);
    for item in rest {
        rect = domain.union(&rect, &item.rect(domain));
    }
    rect
}

fn bound_children<T, D: Domain>(domain: &D, children: &[Node<T, D>]) -> D::Rect {
    let (first, rest) = children.split_first().expect("bounding an empty node");
    let mut rect = first.rect;
    for child in rest {
        rect = domain.union(&rect, &child.rect);
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::euclid::{AabbN, EuclidDomain};

    type D2 = EuclidDomain<f32, 2>;
    type Tree = RTree<AabbN<f32, 2>, D2>;

    fn unit_rect(x: f32, y: f32) -> AabbN<f32, 2> {
        AabbN::new([x, y], [x + 1.0, y + 1.0])
    }

    fn small_tree() -> Tree {
        RTree::with_params(EuclidDomain::new(), Params::new().leaf(4, 1, 2).inner(4, 1, 2))
    }

    #[test]
    fn first_overflow_reinserts_second_splits() {
        let mut tree = small_tree();
        for i in 0..4 {
            tree.insert(unit_rect(i as f32 * 2.0, 0.0)).unwrap();
        }
        assert_eq!(tree.depth(), 0);

        // Drive the overflowing insert by hand to observe the two phases.
        let mut state = ReinsertState::new();
        tree.insert_from_root(unit_rect(8.0, 0.0), &mut state).unwrap();
        tree.len += 1;
        // First overflow at the leaf level: forced reinsertion, not a split.
        assert!(state.tried(0), "leaf level must be marked");
        assert_eq!(state.items.len(), 2, "two farthest entries evicted");
        assert_eq!(tree.depth(), 0);

        // Re-driving the evictions overflows the same leaf again, which now
        // must split and grow the root.
        while let Some(item) = state.items.pop() {
            tree.insert_from_root(item, &mut state).unwrap();
        }
        assert_eq!(tree.depth(), 1);
        tree.assert_invariants();
    }

    #[test]
    fn public_insert_resolves_overflow_in_one_call() {
        let mut tree = small_tree();
        for i in 0..5 {
            tree.insert(unit_rect(i as f32 * 2.0, 0.0)).unwrap();
        }
        // Capacity + 1 inserts: reinsertion first, then the split.
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.len(), 5);
        tree.assert_invariants();
    }

    #[test]
    fn evictions_are_the_farthest_from_center() {
        let domain = D2::new();
        let mut entries = alloc::vec![
            unit_rect(0.0, 0.0),
            unit_rect(10.0, 0.0),
            unit_rect(4.0, 0.0),
            unit_rect(5.0, 0.0),
            unit_rect(-6.0, 0.0),
        ];
        let center = [5.0, 0.5];
        let evicted = evict_farthest(&domain, &mut entries, 2, &center, |r| {
            Bounded::rect(r, &domain)
        });
        // The two entries farthest from x=5 are at x=-6 and x=0.
        assert_eq!(evicted.len(), 2);
        assert!(evicted.iter().any(|r| r.min[0] == -6.0));
        assert!(evicted.iter().any(|r| r.min[0] == 0.0));
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn split_separates_clusters() {
        let domain = D2::new();
        // Two tight clusters along the x axis; a clean split keeps them apart.
        let mut entries = alloc::vec![
            unit_rect(0.0, 0.0),
            unit_rect(1.0, 0.0),
            unit_rect(0.5, 0.0),
            unit_rect(100.0, 0.0),
            unit_rect(101.0, 0.0),
        ];
        let split = compute_split(&domain, &mut entries, 1, |r| Bounded::rect(r, &domain));
        let (first, second) = entries.split_at(split);
        let left_max: f32 = first.iter().map(|r| r.max[0]).fold(f32::MIN, f32::max);
        let right_min: f32 = second.iter().map(|r| r.min[0]).fold(f32::MAX, f32::min);
        assert!(left_max <= right_min, "groups must not interleave");
        assert!(first.len() >= 1 && second.len() >= 1);
    }

    #[test]
    fn choose_subtree_prefers_least_enlargement() {
        let domain = D2::new();
        let children = alloc::vec![
            Node::<AabbN<f32, 2>, D2> {
                rect: AabbN::new([0.0, 0.0], [10.0, 10.0]),
                kind: Kind::Leaf(alloc::vec![]),
            },
            Node::<AabbN<f32, 2>, D2> {
                rect: AabbN::new([20.0, 0.0], [30.0, 10.0]),
                kind: Kind::Leaf(alloc::vec![]),
            },
        ];
        // Fits inside the second child: zero enlargement there.
        let rect = AabbN::new([21.0, 1.0], [22.0, 2.0]);
        assert_eq!(choose_subtree(&domain, &children, &rect), 1);
        // Ties on enlargement go to the smaller child.
        let children = alloc::vec![
            Node::<AabbN<f32, 2>, D2> {
                rect: AabbN::new([0.0, 0.0], [10.0, 10.0]),
                kind: Kind::Leaf(alloc::vec![]),
            },
            Node::<AabbN<f32, 2>, D2> {
                rect: AabbN::new([2.0, 2.0], [6.0, 6.0]),
                kind: Kind::Leaf(alloc::vec![]),
            },
        ];
        let rect = AabbN::new([3.0, 3.0], [4.0, 4.0]);
        assert_eq!(choose_subtree(&domain, &children, &rect), 1);
    }

    #[test]
    fn depth_grows_monotonically_under_load() {
        let mut tree = small_tree();
        let mut last_depth = 0;
        for i in 0..200 {
            let x = (i % 20) as f32 * 3.0;
            let y = (i / 20) as f32 * 3.0;
            tree.insert(unit_rect(x, y)).unwrap();
            assert!(tree.depth() >= last_depth);
            last_depth = tree.depth();
        }
        assert!(tree.depth() >= 2);
        tree.assert_invariants();
    }
}
