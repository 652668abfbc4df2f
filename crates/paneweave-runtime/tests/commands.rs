//! Command layer behaviour through the public API.

use paneweave_core::{Bounds, ContentId, NodeId, PaneId};
use paneweave_layout::{Orientation, PaneTree, SizeConstraints, SplitPosition, normalize};
use paneweave_runtime::{Command, CommandError, CommandState, ControllerError, LayoutController, SplitIds};
use proptest::prelude::*;

fn pane(raw: &str) -> PaneId {
    PaneId::new(raw).expect("pane id")
}

fn node(raw: &str) -> NodeId {
    NodeId::new(raw).expect("node id")
}

fn content(raw: &str) -> ContentId {
    ContentId::new(raw).expect("content id")
}

fn pinned_split(target: &str, new_pane: &str, split: &str, position: SplitPosition) -> Command {
    Command::split(pane(target), content(&format!("c-{new_pane}")), position, 0.5).with_split_ids(
        SplitIds {
            pane_id: pane(new_pane),
            node_id: node(split),
        },
    )
}

/// `p1 | p2 | p3` under split `s1`.
fn three_wide() -> LayoutController {
    let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")));
    let _ = ctl
        .execute_command(pinned_split("p1", "p2", "s1", SplitPosition::Right))
        .expect("first split");
    let _ = ctl
        .execute_command(pinned_split("p2", "p3", "unused", SplitPosition::After))
        .expect("sibling insert");
    ctl
}

#[test]
fn split_right_then_solve() {
    let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")));
    let _ = ctl
        .execute_command(pinned_split("p1", "p2", "s1", SplitPosition::Right))
        .expect("split");

    let split = ctl.tree().find_split(&node("s1")).expect("root split");
    assert_eq!(split.orientation(), Orientation::Horizontal);
    assert_eq!(split.ratios(), &[0.5, 0.5]);

    let layout = ctl.solve(Bounds::from_size(800, 600));
    assert_eq!(layout.pane_bounds(&pane("p1")), Bounds::new(0, 0, 398, 600).ok());
    assert_eq!(layout.pane_bounds(&pane("p2")), Bounds::new(402, 0, 398, 600).ok());
    assert_eq!(layout.dividers.len(), 1);
    assert_eq!(layout.dividers[0].bounds, Bounds::new(398, 0, 4, 600).expect("divider"));
}

#[test]
fn set_ratios_accepts_a_full_distribution() {
    let mut ctl = three_wide();
    let split = ctl.tree().find_split(&node("s1")).expect("split");
    assert_eq!(split.children().len(), 3);

    let _ = ctl
        .execute_command(Command::set_ratios(node("s1"), vec![0.6, 0.3, 0.1]))
        .expect("valid ratios");
    let split = ctl.tree().find_split(&node("s1")).expect("split");
    assert_eq!(split.ratios(), &[0.6, 0.3, 0.1]);
}

#[test]
fn set_ratios_with_wrong_count_changes_nothing() {
    let mut ctl = three_wide();
    let before = ctl.tree().find_split(&node("s1")).expect("split").ratios().to_vec();

    let err = ctl
        .execute_command(Command::set_ratios(node("s1"), vec![0.6, 0.3]))
        .expect_err("two ratios for three children");
    assert!(matches!(err, ControllerError::Command(CommandError::InvalidArgument(_))));

    let after = ctl.tree().find_split(&node("s1")).expect("split").ratios().to_vec();
    assert_eq!(before, after);
    assert_eq!(ctl.undo_descriptions(10).len(), 2);
}

#[test]
fn sibling_split_with_vanishing_share_is_an_invalid_argument() {
    let mut ctl = three_wide();
    let before = ctl.tree().clone();

    let command = Command::split(pane("p3"), content("c-x"), SplitPosition::After, 5e-324)
        .with_split_ids(SplitIds {
            pane_id: pane("px"),
            node_id: node("unused-x"),
        });
    let err = ctl.execute_command(command).expect_err("share underflows to zero");
    let ControllerError::Command(err) = err else {
        panic!("expected a command error, got {err:?}");
    };
    assert!(matches!(err, CommandError::InvalidArgument(_)));
    assert!(err.is_recoverable());

    assert_eq!(ctl.tree(), &before);
    assert!(ctl.tree().validate_structure().is_empty());
    assert_eq!(ctl.undo_descriptions(10).len(), 2);
}

#[test]
fn removing_a_middle_pane_renormalizes() {
    let mut ctl = three_wide();
    let _ = ctl
        .execute_command(Command::set_ratios(node("s1"), vec![0.5, 0.25, 0.25]))
        .expect("ratios");
    let _ = ctl
        .execute_command(Command::remove(pane("p2")))
        .expect("remove");

    let split = ctl.tree().find_split(&node("s1")).expect("split survives");
    let ratios = split.ratios();
    assert_eq!(ratios.len(), 2);
    assert!((ratios[0] - 2.0 / 3.0).abs() < 1e-9);
    assert!((ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn removing_down_to_one_child_collapses_the_split() {
    let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")));
    let _ = ctl
        .execute_command(pinned_split("p1", "p2", "s1", SplitPosition::Right))
        .expect("split");
    let _ = ctl
        .execute_command(pinned_split("p2", "p3", "s2", SplitPosition::Bottom))
        .expect("nested split");
    let _ = ctl
        .execute_command(Command::remove(pane("p3")))
        .expect("remove");

    assert!(ctl.tree().find_split(&node("s2")).is_none());
    assert_eq!(ctl.tree().parent_of(&pane("p2")), Some(&node("s1")));
    assert!(ctl.tree().validate_structure().is_empty());
}

#[test]
fn set_constraints_rejects_max_below_min() {
    let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")));
    let bad = SizeConstraints::with_min(200, 0).with_max(Some(100), None);
    assert!(ctl.execute_command(Command::set_constraints(pane("p1"), bad)).is_err());
    assert_eq!(
        ctl.tree().find_by_pane_id(&pane("p1")).map(|leaf| *leaf.constraints()),
        Some(SizeConstraints::NONE)
    );
}

#[test]
fn execute_and_undo_are_guarded() {
    let mut tree = PaneTree::singleton(pane("p1"), content("c1"));
    let mut command = pinned_split("p1", "p2", "s1", SplitPosition::Top);

    assert!(matches!(command.undo(&mut tree), Err(CommandError::NotExecuted { .. })));
    command.execute(&mut tree).expect("first execute");
    assert!(matches!(
        command.execute(&mut tree),
        Err(CommandError::AlreadyExecuted { .. })
    ));
    command.undo(&mut tree).expect("first undo");
    assert_eq!(command.state(), CommandState::Undone);
    assert!(matches!(command.undo(&mut tree), Err(CommandError::NotExecuted { .. })));
}

#[test]
fn redo_recreates_the_same_ids() {
    let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")));
    let report = ctl
        .split_pane(pane("p1"), content("c2"), SplitPosition::Left)
        .expect("split");
    let created = report.diff.added.iter().next().cloned().expect("new pane");
    let _ = ctl
        .execute_command(Command::remove(created.clone()))
        .expect("remove the new pane");

    let _ = ctl.undo().expect("undo remove");
    let _ = ctl.undo().expect("undo split");
    let _ = ctl.redo().expect("redo split");
    assert!(ctl.tree().contains(&created));
    let _ = ctl.redo().expect("redo remove").expect("entry");
    assert!(!ctl.tree().contains(&created));
}

// ---------------------------------------------------------------------------
// Undo restores the serialized tree for any command
// ---------------------------------------------------------------------------

struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 17
    }

    fn pick(&mut self, len: usize) -> usize {
        (self.next() % len as u64) as usize
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

fn random_command(rng: &mut Lcg, tree: &PaneTree) -> Command {
    let panes = tree.pane_ids();
    let target = panes[rng.pick(panes.len())].clone();
    match rng.pick(4) {
        0 => {
            let ratio = 0.1 + (rng.next() % 80) as f64 / 100.0;
            let position = POSITIONS[rng.pick(POSITIONS.len())];
            Command::split(target, content("fresh"), position, ratio)
        }
        1 => Command::remove(target),
        2 => match tree.parent_of(&target).cloned() {
            Some(node_id) => {
                let count = tree.find_split(&node_id).map_or(2, |s| s.children().len());
                let weights: Vec<f64> = (0..count).map(|_| 1.0 + (rng.next() % 9) as f64).collect();
                Command::set_ratios(node_id, normalize(&weights))
            }
            None => Command::remove(target),
        },
        _ => {
            let min = (rng.next() % 300) as i32;
            Command::set_constraints(target, SizeConstraints::with_min(min, min / 2))
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_restores_serialized_state(seed in any::<u64>(), warmup in 0usize..12) {
        let mut rng = Lcg(seed);
        let mut tree = PaneTree::singleton(pane("p0"), content("c0"));

        for _ in 0..warmup {
            if tree.is_empty() {
                break;
            }
            let mut command = random_command(&mut rng, &tree);
            let _ = command.execute(&mut tree);
        }
        prop_assume!(!tree.is_empty());

        let before = tree.to_json().expect("serialize");
        let mut command = random_command(&mut rng, &tree);
        if command.execute(&mut tree).is_ok() {
            command.undo(&mut tree).expect("undo after execute");
        }
        prop_assert_eq!(tree.to_json().expect("serialize"), before);
        prop_assert!(tree.validate_structure().is_empty());
    }
}
