#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use cpm_engine::{
    PersistenceError, PlanStore, PredecessorLink, ProjectPlan, RelationshipType, ScheduleMetadata,
    SqlitePlanStore, TaskDescriptor,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_plan() -> ProjectPlan {
    let mut metadata = ScheduleMetadata::default().with_start_date(d(2025, 1, 6));
    metadata.project_name = "SQLite Project".into();
    metadata.manager = "A. Planner".into();
    ProjectPlan::with_tasks(
        metadata,
        vec![
            TaskDescriptor::new("Z-design").with_name("Design").with_duration(5),
            TaskDescriptor::new("A-build")
                .with_name("Build")
                .with_wbs_code("2")
                .with_duration(10)
                .after("Z-design")
                .with_predecessor(PredecessorLink::new("Z-design", RelationshipType::SS, 3))
                .with_predecessor(PredecessorLink::new("external", RelationshipType::FF, -2)),
        ],
    )
}

#[test]
fn sqlite_store_round_trip_plan() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();
    let plan = sample_plan();

    store.save_plan(&plan).unwrap();
    let loaded = store.load_plan().unwrap().expect("plan stored");
    assert_eq!(loaded, plan);

    // Task order survives even though ids sort the other way.
    assert_eq!(loaded.tasks[0].id, "Z-design");
}

#[test]
fn links_to_unknown_tasks_survive_storage() {
    let store = SqlitePlanStore::in_memory().unwrap();
    store.save_plan(&sample_plan()).unwrap();
    let loaded = store.load_plan().unwrap().unwrap();

    let engine = loaded.engine().unwrap();
    assert_eq!(engine.coverage().unresolved_links, 1);
    assert_eq!(engine.calculate().project_duration, 15);
}

#[test]
fn empty_store_has_no_plan() {
    let store = SqlitePlanStore::in_memory().unwrap();
    assert!(store.load_plan().unwrap().is_none());
}

#[test]
fn saving_replaces_previous_plan() {
    let store = SqlitePlanStore::in_memory().unwrap();
    store.save_plan(&sample_plan()).unwrap();

    let replacement = ProjectPlan::with_tasks(
        ScheduleMetadata::default(),
        vec![TaskDescriptor::new("only").with_duration(1)],
    );
    store.save_plan(&replacement).unwrap();

    let loaded = store.load_plan().unwrap().unwrap();
    assert_eq!(loaded, replacement);
}

#[test]
fn invalid_plan_is_not_saved() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let plan = ProjectPlan::with_tasks(
        ScheduleMetadata::default(),
        vec![TaskDescriptor::new("A"), TaskDescriptor::new("A")],
    );
    assert!(matches!(
        store.save_plan(&plan),
        Err(PersistenceError::InvalidTasks(_))
    ));
    assert!(store.load_plan().unwrap().is_none());
}
