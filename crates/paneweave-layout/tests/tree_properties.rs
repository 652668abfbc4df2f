//! Property tests over random edit streams.
//!
//! Trees are grown and pruned through the public edit API, then checked for
//! structural soundness, pixel-exact geometry, and reconciler symmetry.

use paneweave_core::{Bounds, ContentId, NodeId, PaneId};
use paneweave_layout::{
    LeafNode, PaneTree, SplitPosition, ViolationCode, compute, compute_dividers, diff_trees,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 11
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn ratio(&mut self) -> f64 {
        0.05 + (self.next_u64() % 900) as f64 / 1000.0
    }
}

const POSITIONS: [SplitPosition; 6] = [
    SplitPosition::Left,
    SplitPosition::Right,
    SplitPosition::Top,
    SplitPosition::Bottom,
    SplitPosition::Before,
    SplitPosition::After,
];

fn pane(n: usize) -> PaneId {
    PaneId::new(format!("p{n}")).expect("pane id")
}

fn content(seed: u64, n: usize) -> ContentId {
    ContentId::new(format!("c{}-{n}", seed % 3)).expect("content id")
}

/// Grow a tree from `p0` with `steps` random edits; roughly one in four
/// edits removes a pane.
fn grow(seed: u64, steps: usize, on_step: &mut impl FnMut(&PaneTree, bool)) -> PaneTree {
    let mut rng = Lcg::new(seed);
    let mut tree = PaneTree::singleton(pane(0), content(seed, 0));
    let mut next = 1;

    for _ in 0..steps {
        let leaves = tree.pane_ids();
        if leaves.is_empty() {
            tree = PaneTree::singleton(pane(next), content(seed, next));
            next += 1;
            continue;
        }
        let target = leaves[rng.choose_index(leaves.len())].clone();
        let removing = leaves.len() > 1 && rng.next_u64() % 4 == 0;
        if removing {
            tree.remove_pane(&target).expect("removing a listed pane succeeds");
        } else {
            let position = POSITIONS[rng.choose_index(POSITIONS.len())];
            let result = tree.split_pane(
                &target,
                LeafNode::new(pane(next), content(seed, next)),
                position,
                rng.ratio(),
                NodeId::new(format!("s{next}")).expect("node id"),
            );
            match result {
                Ok(()) => next += 1,
                Err(err) => {
                    assert!(
                        matches!(position, SplitPosition::Before | SplitPosition::After),
                        "only sibling insertion on the root may fail, got {err}"
                    );
                    assert!(tree.parent_of(&target).is_none());
                }
            }
        }
        on_step(&tree, removing);
    }
    tree
}

fn assert_exact_tiling(tree: &PaneTree, outer: Bounds, divider: i32) {
    let Some(root) = tree.root() else {
        return;
    };
    let panes = compute(root, outer, divider);
    let dividers = compute_dividers(root, outer, divider);
    assert_eq!(panes.len(), tree.leaf_count());

    let rects = panes
        .values()
        .copied()
        .chain(dividers.iter().map(|d| d.bounds))
        .collect::<Vec<_>>();

    let total = rects.iter().map(Bounds::area).sum::<i64>();
    assert_eq!(total, outer.area(), "pieces must cover the outer area exactly");

    for (i, a) in rects.iter().enumerate() {
        assert!(outer.contains_bounds(a), "{a:?} escapes {outer:?}");
        for b in &rects[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn edits_keep_tree_sound(seed in any::<u64>(), steps in 1usize..48) {
        let tree = grow(seed, steps, &mut |tree, removing| {
            let violations = tree.validate_structure();
            assert!(violations.is_empty(), "violations: {violations:?}");
            if removing {
                assert!(
                    violations.iter().all(|v| v.code != ViolationCode::UnderfilledSplit)
                );
            }
            if let Some(focused) = tree.focused() {
                assert!(tree.contains(focused));
            }
        });
        let json = tree.to_json().expect("serialize");
        let back = PaneTree::from_json(&json).expect("reload");
        prop_assert_eq!(back.state_hash(), tree.state_hash());
    }

    #[test]
    fn geometry_tiles_exactly(
        seed in any::<u64>(),
        steps in 0usize..40,
        x in -500i32..500,
        y in -500i32..500,
        width in 0i32..2400,
        height in 0i32..1600,
        divider in 0i32..9,
    ) {
        let outer = Bounds::new(x, y, width, height).expect("non-negative size");
        let tree = grow(seed, steps, &mut |_, _| {});
        assert_exact_tiling(&tree, outer, divider);
    }

    #[test]
    fn reconciler_is_symmetric(
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
        steps_a in 0usize..24,
        steps_b in 0usize..24,
    ) {
        let a = grow(seed_a, steps_a, &mut |_, _| {});
        let b = grow(seed_b, steps_b, &mut |_, _| {});
        let forward = diff_trees(&a, &b);
        let backward = diff_trees(&b, &a);

        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
        prop_assert_eq!(&forward.moved, &backward.moved);
        prop_assert_eq!(&forward.modified, &backward.modified);
        prop_assert!(diff_trees(&a, &a).is_empty());
    }
}

#[test]
fn split_right_at_800_by_600() {
    let p1 = PaneId::new("p1").expect("pane id");
    let mut tree = PaneTree::singleton(p1.clone(), ContentId::new("c1").expect("content"));
    tree.split_pane(
        &p1,
        LeafNode::new(
            PaneId::new("p2").expect("pane id"),
            ContentId::new("c2").expect("content"),
        ),
        SplitPosition::Right,
        0.5,
        NodeId::generate(),
    )
    .expect("split right");

    let layout = tree.solve(Bounds::from_size(800, 600), 4);
    assert_eq!(
        layout.pane_bounds(&p1),
        Some(Bounds::new(0, 0, 398, 600).expect("bounds"))
    );
    assert_eq!(
        layout.pane_bounds(&PaneId::new("p2").expect("pane id")),
        Some(Bounds::new(402, 0, 398, 600).expect("bounds"))
    );
    assert_eq!(
        layout.dividers[0].bounds,
        Bounds::new(398, 0, 4, 600).expect("bounds")
    );
}
