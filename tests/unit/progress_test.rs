//! Unit tests for the progress aggregator.
//!
//! Sweeps small checklists and roadmaps through every mutation and checks
//! that the derived counters always agree with the collection.

use duodash::goals::progress::{apply_leaf_op, compute_percentage, toggle_roadmap_step};
use duodash::goals::{Goal, GoalCategory, GoalKind, LeafOp, RoadmapStep, RoadmapSubstep, RoomItem};

fn room(n: usize) -> Goal {
    let items = (0..n)
        .map(|i| RoomItem {
            title: format!("Item {i}"),
            completed: false,
            notes: None,
        })
        .collect();
    Goal::new("Room", GoalCategory::Casa, GoalKind::Room { items })
}

fn step(title: &str, substeps: usize) -> RoadmapStep {
    RoadmapStep {
        title: title.to_string(),
        completed: false,
        notes: None,
        blocked: false,
        substeps: (0..substeps)
            .map(|i| RoadmapSubstep {
                title: format!("{title}.{i}"),
                completed: false,
                notes: None,
            })
            .collect(),
    }
}

fn assert_counts_match(goal: &Goal) {
    let leaves = goal.kind.leaf_progress().unwrap();
    assert_eq!(goal.current_value, leaves.completed);
    assert_eq!(goal.target_value, Some(leaves.total));
    assert!(goal.current_value <= goal.target_value.unwrap());
}

#[test]
fn test_percentage_is_bounded() {
    for target in [None, Some(-10), Some(0), Some(1), Some(7), Some(1000)] {
        for current in [-500, -1, 0, 1, 3, 7, 999, 1000, 5000] {
            let pct = compute_percentage(current, target);
            assert!((0.0..=100.0).contains(&pct), "{current}/{target:?} gave {pct}");
        }
    }
    assert_eq!(compute_percentage(3, Some(4)), 75.0);
    assert_eq!(compute_percentage(5, None), 0.0);
    assert_eq!(compute_percentage(5, Some(0)), 0.0);
}

#[test]
fn test_room_counts_follow_every_toggle() {
    for n in 1..=5 {
        let mut goal = room(n);
        assert_counts_match(&goal);

        for index in 0..n {
            apply_leaf_op(&mut goal.kind, LeafOp::Toggle { index }).unwrap();
            goal.sync_leaf_counts();
            assert_counts_match(&goal);
            assert_eq!(goal.current_value, index as i64 + 1);
        }
        assert_eq!(goal.percentage(), 100.0);

        apply_leaf_op(&mut goal.kind, LeafOp::Toggle { index: 0 }).unwrap();
        goal.sync_leaf_counts();
        assert_counts_match(&goal);
        assert_eq!(goal.current_value, n as i64 - 1);
    }
}

#[test]
fn test_add_then_remove_restores_collection() {
    for n in 0..4 {
        let mut goal = room(n);
        let before = goal.kind.clone();

        apply_leaf_op(
            &mut goal.kind,
            LeafOp::Add {
                title: "Extra".to_string(),
            },
        )
        .unwrap();
        apply_leaf_op(&mut goal.kind, LeafOp::Remove { index: n }).unwrap();

        assert_eq!(goal.kind, before);
    }
}

#[test]
fn test_blank_title_is_rejected() {
    let mut goal = room(2);
    let before = goal.kind.clone();
    let result = apply_leaf_op(
        &mut goal.kind,
        LeafOp::Add {
            title: "   ".to_string(),
        },
    );
    assert!(result.is_err());
    assert_eq!(goal.kind, before);
}

#[test]
fn test_stale_index_leaves_goal_untouched() {
    let mut goal = room(3);
    let before = goal.kind.clone();
    for op in [LeafOp::Toggle { index: 3 }, LeafOp::Remove { index: 10 }] {
        assert!(apply_leaf_op(&mut goal.kind, op).is_err());
        assert_eq!(goal.kind, before);
    }
}

#[test]
fn test_auto_complete_is_one_way() {
    for substeps in 1..=4 {
        let mut steps = vec![step("Build", substeps)];

        for i in 0..substeps {
            let outcome = toggle_roadmap_step(&mut steps, 0, Some(i)).unwrap();
            let last = i == substeps - 1;
            assert_eq!(steps[0].completed, last);
            assert_eq!(outcome.completed_parent.is_some(), last);
        }

        // Unchecking any substep never reopens the step
        for i in 0..substeps {
            toggle_roadmap_step(&mut steps, 0, Some(i)).unwrap();
            assert!(steps[0].completed);
        }
    }
}

#[test]
fn test_roadmap_counts_steps_not_substeps() {
    let mut goal = Goal::new(
        "Shop",
        GoalCategory::Business,
        GoalKind::Roadmap {
            steps: vec![step("Plan", 3), step("Open", 0)],
        },
    );
    assert_eq!(goal.target_value, Some(2));

    apply_leaf_op(&mut goal.kind, LeafOp::ToggleSubstep { step: 0, substep: 1 }).unwrap();
    goal.sync_leaf_counts();
    assert_eq!(goal.current_value, 0);

    apply_leaf_op(&mut goal.kind, LeafOp::Toggle { index: 1 }).unwrap();
    goal.sync_leaf_counts();
    assert_counts_match(&goal);
    assert_eq!(goal.percentage(), 50.0);
}

#[test]
fn test_single_step_roadmap_reaches_full_progress() {
    let mut goal = Goal::new(
        "Launch",
        GoalCategory::Business,
        GoalKind::Roadmap {
            steps: vec![step("Go live", 0)],
        },
    );
    apply_leaf_op(&mut goal.kind, LeafOp::Toggle { index: 0 }).unwrap();
    goal.sync_leaf_counts();
    assert_eq!(goal.percentage(), 100.0);
    assert!(goal.is_complete());
}
