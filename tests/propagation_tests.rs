//! Label propagation tests
mod common;

use common::*;
use gtd_autolabel::*;

fn now() -> chrono::NaiveDateTime {
    at(2026, 3, 1, 12)
}

#[test]
fn test_parallel_project_labels_every_root() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Groceries=")
        .task("milk", "p1", "Milk")
        .task("eggs", "p1", "Eggs")
        .task("bread", "p1", "Bread")
        .build();
    let mut store = ClassificationStore::new();

    let outcome = cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["milk", "eggs", "bread"]);
    assert_eq!(outcome.marked, 3);
    assert_eq!(
        store.disposition(RecordKind::Project, "p1").to_string(),
        "ppp"
    );
}

#[test]
fn test_sequential_project_labels_first_root_only() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design")
        .task("build", "p1", "Build")
        .task("ship", "p1", "Ship")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["design"]);
}

#[test]
fn test_completing_first_task_moves_label_to_next() {
    let settings = EngineSettings::default();
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design")
        .task("build", "p1", "Build")
        .task("ship", "p1", "Ship")
        .build();
    let mut store = ClassificationStore::new();
    cycle(&settings, &mut snapshot, &mut store, now());

    snapshot.find_task_mut("design").unwrap().is_completed = true;
    let outcome = cycle(&settings, &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["build"]);
    // Stale label on the completed task is removed, Ship is left alone
    assert_eq!(
        outcome.changes.commands(),
        &[
            Command::UpdateTaskLabels {
                id: "design".to_string(),
                labels: vec![],
            },
            Command::UpdateTaskLabels {
                id: "build".to_string(),
                labels: vec![LABEL.to_string()],
            },
        ]
    );
}

#[test]
fn test_second_cycle_without_edits_changes_nothing() {
    let settings = EngineSettings::default();
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design-")
        .subtask("sketch", "design", "Sketch")
        .subtask("review", "design", "Review")
        .task("build", "p1", "Build")
        .project("p2", "Groceries=")
        .task("milk", "p2", "Milk")
        .build();
    let mut store = ClassificationStore::new();

    let first = cycle(&settings, &mut snapshot, &mut store, now());
    assert!(!first.changes.is_empty());

    let second = cycle(&settings, &mut snapshot, &mut store, now());
    assert!(second.changes.is_empty());
    assert_eq!(marked(&snapshot), vec!["sketch", "milk"]);
}

#[test]
fn test_project_marker_change_resets_every_task() {
    let settings = EngineSettings::default();
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Errands=")
        .task("a", "p1", "Post office")
        .task("b", "p1", "Bank")
        .task("c", "p1", "Pharmacy")
        .build();
    let mut store = ClassificationStore::new();
    cycle(&settings, &mut snapshot, &mut store, now());
    assert_eq!(marked(&snapshot), vec!["a", "b", "c"]);

    snapshot.projects[0].name = "Errands-".to_string();
    cycle(&settings, &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["a"]);
    assert_eq!(
        store.disposition(RecordKind::Project, "p1").to_string(),
        "sss"
    );
}

#[test]
fn test_sequential_task_passes_label_to_first_child() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Home=")
        .task("trip", "p1", "Plan trip-")
        .subtask("book", "trip", "Book hotel")
        .subtask("pack", "trip", "Pack")
        .subtask("go", "trip", "Go")
        .task("laundry", "p1", "Laundry")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["book", "laundry"]);
    assert_eq!(store.parent_type("pack"), Some(Disposition::Sequential));
}

#[test]
fn test_parallel_task_labels_every_child() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Chores-")
        .task("clean", "p1", "Clean=")
        .subtask("kitchen", "clean", "Kitchen")
        .subtask("bath", "clean", "Bathroom")
        .task("cook", "p1", "Cook")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["kitchen", "bath"]);
}

#[test]
fn test_grandchildren_inherit_parent_type() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Move-")
        .task("pack", "p1", "Pack")
        .subtask("kitchen", "pack", "Kitchen")
        .subtask("plates", "kitchen", "Plates")
        .subtask("cups", "kitchen", "Cups")
        .subtask("bedroom", "pack", "Bedroom")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["plates"]);
    assert_eq!(store.parent_type("cups"), Some(Disposition::Sequential));
}

#[test]
fn test_completed_children_leave_label_on_parent() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design")
        .subtask("sketch", "design", "Sketch")
        .completed("sketch")
        .labelled("sketch")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["design"]);
}

#[test]
fn test_header_directive_on_root_blocks_subtree() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "** Design")
        .subtask("sketch", "design", "Sketch-")
        .subtask("detail", "sketch", "Detail")
        .task("build", "p1", "Build")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(content(&snapshot, "design"), "* Design");
    assert_eq!(content(&snapshot, "sketch"), "* Sketch-");
    assert_eq!(content(&snapshot, "detail"), "* Detail");
    // A header does not take the first place in the chain
    assert_eq!(marked(&snapshot), vec!["build"]);
}

#[test]
fn test_header_off_directive_restores_tasks() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "-* * Design")
        .subtask("sketch", "design", "* Sketch")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(content(&snapshot, "design"), "Design");
    assert_eq!(content(&snapshot, "sketch"), "Sketch");
    assert_eq!(marked(&snapshot), vec!["sketch"]);
}

#[test]
fn test_section_header_directive_renames_and_headers_tasks() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Work=")
        .section("s1", "p1", "** Notes")
        .task_in("read", "p1", "s1", "Read")
        .task_in("write", "p1", "s1", "Write")
        .build();
    let mut store = ClassificationStore::new();

    let outcome = cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert!(outcome.changes.commands().contains(&Command::RenameSection {
        id: "s1".to_string(),
        name: "Notes".to_string(),
    }));
    assert_eq!(snapshot.sections[0].name, "Notes");
    assert_eq!(content(&snapshot, "read"), "* Read");
    assert!(marked(&snapshot).is_empty());
}

#[test]
fn test_sequential_project_only_works_first_section() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .section("s1", "p1", "Phase 1")
        .section("s2", "p1", "Phase 2")
        .task_in("a", "p1", "s1", "Research")
        .task_in("b", "p1", "s2", "Prototype")
        .labelled("b")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["a"]);

    // Finishing phase 1 opens phase 2
    snapshot.find_task_mut("a").unwrap().is_completed = true;
    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());
    assert_eq!(marked(&snapshot), vec!["b"]);
}

#[test]
fn test_section_markers_under_sequential_and_unmarked_projects() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Week-")
        .task("plan", "p1", "Plan week")
        .section("s1", "p1", "Errands=")
        .task_in("post", "p1", "s1", "Post office")
        .task_in("bank", "p1", "s1", "Bank")
        .project("p2", "Garden")
        .section("s2", "p2", "Beds=")
        .task_in("weed", "p2", "s2", "Weed")
        .task_in("water", "p2", "s2", "Water")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    // p1 is sequential: only the unsectioned task; p2 has no marker, its section decides
    assert_eq!(marked(&snapshot), vec!["plan", "weed", "water"]);
}

#[test]
fn test_board_section_disables_labelling() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Board=")
        .section("s1", "p1", "*Backlog")
        .task_in("idea", "p1", "s1", "Idea")
        .labelled("idea")
        .section("s2", "p1", "Doing")
        .task_in("work", "p1", "s2", "Work")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["work"]);
}

#[test]
fn test_unclassified_root_loses_stale_label_only() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Misc")
        .task("stale", "p1", "Stale")
        .labelled("stale")
        .subtask("kid", "stale", "Kid")
        .labelled("kid")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["kid"]);
}

#[test]
fn test_root_with_own_marker_is_independent_chain() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Misc")
        .task("tour", "p1", "Tour-")
        .subtask("a", "tour", "Museum")
        .subtask("b", "tour", "Park")
        .task("other", "p1", "Other")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["a"]);
}

#[test]
fn test_sequential_root_after_first_place_waits() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Home")
        .section("s1", "p1", "Chores=")
        .task_in("dishes", "p1", "s1", "Dishes")
        .task_in("errands", "p1", "s1", "Errands-")
        .subtask("bank", "errands", "Bank")
        .subtask("post", "errands", "Post")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    // Errands is sequential and not first, so nothing below it is labelled
    assert_eq!(marked(&snapshot), vec!["dishes"]);
}

#[test]
fn test_parallel_root_in_sequential_project_is_labelled() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design")
        .task("docs", "p1", "Docs=")
        .subtask("readme", "docs", "Readme")
        .subtask("guide", "docs", "Guide")
        .task("ship", "p1", "Ship")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["design", "readme", "guide"]);
}

#[test]
fn test_inert_tasks_keep_no_disposition() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("notes", "p1", "* Notes-")
        .subtask("idea", "notes", "Idea=")
        .task("done", "p1", "Done=")
        .completed("done")
        .task("build", "p1", "Build")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["build"]);
    assert!(store.record(RecordKind::Task, "notes").is_none());
    assert!(store.record(RecordKind::Task, "idea").is_none());
    assert!(store.record(RecordKind::Task, "done").is_none());
}

#[test]
fn test_task_marker_change_resets_subtree() {
    let settings = EngineSettings::default();
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Home=")
        .task("trip", "p1", "Trip=")
        .subtask("book", "trip", "Book")
        .subtask("pack", "trip", "Pack")
        .build();
    let mut store = ClassificationStore::new();
    cycle(&settings, &mut snapshot, &mut store, now());
    assert_eq!(marked(&snapshot), vec!["book", "pack"]);

    snapshot.find_task_mut("trip").unwrap().content = "Trip-".to_string();
    cycle(&settings, &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["book"]);
    assert_eq!(store.parent_type("pack"), Some(Disposition::Sequential));
}

#[test]
fn test_inbox_is_skipped_by_default() {
    let mut snapshot = SnapshotBuilder::new()
        .inbox("in")
        .task("x", "in", "Call mum")
        .labelled("x")
        .task("y", "in", "Buy stamps")
        .build();
    let mut store = ClassificationStore::new();

    let outcome = cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert!(outcome.changes.is_empty());
    assert_eq!(marked(&snapshot), vec!["x"]);
}

#[test]
fn test_inbox_uses_configured_disposition() {
    let settings = EngineSettings {
        inbox: Some(Disposition::Parallel),
        ..Default::default()
    };
    let mut snapshot = SnapshotBuilder::new()
        .inbox("in")
        .task("x", "in", "Call mum")
        .task("y", "in", "Buy stamps")
        .build();
    let mut store = ClassificationStore::new();

    cycle(&settings, &mut snapshot, &mut store, now());

    assert_eq!(marked(&snapshot), vec!["x", "y"]);
}

#[test]
fn test_custom_label_and_markers() {
    let settings = EngineSettings {
        label: "now".to_string(),
        markers: Markers {
            sequential: '>',
            parallel: '+',
        },
        ..Default::default()
    };
    let snapshot = SnapshotBuilder::new()
        .project("p1", "Launch>")
        .task("design", "p1", "Design")
        .task("build", "p1", "Build")
        .build();
    let mut store = ClassificationStore::new();

    let outcome = propagate(&settings, &snapshot, &mut store, now());

    assert_eq!(
        outcome.changes.commands(),
        &[Command::UpdateTaskLabels {
            id: "design".to_string(),
            labels: vec!["now".to_string()],
        }]
    );
}

#[test]
fn test_other_labels_are_preserved() {
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Launch-")
        .task("design", "p1", "Design")
        .build();
    snapshot.tasks[0].labels = vec!["work".to_string()];
    let mut store = ClassificationStore::new();

    cycle(&EngineSettings::default(), &mut snapshot, &mut store, now());

    assert_eq!(
        snapshot.tasks[0].labels,
        vec!["work".to_string(), LABEL.to_string()]
    );
}

#[test]
fn test_end_of_day_moves_late_completion_back_to_today() {
    let settings = EngineSettings {
        end_of_day: Some(recurring::EndOfDayShift::new(4)),
        ..Default::default()
    };
    let water = Due {
        date: date(2026, 3, 1),
        datetime: None,
        is_recurring: true,
        string: Some("every day".to_string()),
    };
    let mut snapshot = SnapshotBuilder::new()
        .project("p1", "Home=")
        .task("water", "p1", "Water plants")
        .due("water", water)
        .build();
    let mut store = ClassificationStore::new();

    cycle(&settings, &mut snapshot, &mut store, at(2026, 3, 1, 10));
    assert_eq!(store.due_date("water"), Some(date(2026, 3, 1)));

    // Completed at 01:00 on the 2nd; the service moved it to the 3rd
    snapshot.find_task_mut("water").unwrap().due.as_mut().unwrap().date = date(2026, 3, 3);
    let outcome = propagate(&settings, &snapshot, &mut store, at(2026, 3, 2, 2));

    assert!(outcome.changes.commands().contains(&Command::UpdateTaskDue {
        id: "water".to_string(),
        date: date(2026, 3, 2),
        string: Some("every day".to_string()),
    }));
    assert_eq!(store.due_date("water"), Some(date(2026, 3, 3)));
}
