use chrono::NaiveDate;
use cpm_engine::persistence::write_result_csv;
use cpm_engine::{
    PersistenceError, PredecessorLink, ProjectPlan, RelationshipType, ScheduleMetadata,
    TaskDescriptor, TaskInputError, calculate, load_plan_from_json, load_tasks_from_csv,
    save_plan_to_json, save_tasks_to_csv,
};
use std::fs;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_plan() -> ProjectPlan {
    let mut metadata = ScheduleMetadata::default().with_start_date(d(2025, 1, 6));
    metadata.project_name = "Export Project".into();
    metadata.project_description = "Testing persistence helpers".into();
    metadata.manager = "J. Doe".into();

    ProjectPlan::with_tasks(
        metadata,
        vec![
            TaskDescriptor::new("A")
                .with_name("Design")
                .with_wbs_code("1.1")
                .with_duration(5),
            TaskDescriptor::new("B")
                .with_name("Build")
                .with_wbs_code("1.2")
                .with_duration(3)
                .with_predecessor(PredecessorLink::new("A", RelationshipType::SS, 2)),
            TaskDescriptor::new("C")
                .with_name("Review")
                .with_wbs_code("1.3")
                .with_duration(2)
                .after("A")
                .with_predecessor(PredecessorLink::new("B", RelationshipType::FF, -1)),
        ],
    )
}

#[test]
fn json_plan_round_trip() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    save_plan_to_json(&plan, file.path()).unwrap();
    let loaded = load_plan_from_json(file.path()).unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn json_loader_accepts_bare_task_array() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"[{"id":"A","durationDays":2},{"id":"B","predecessors":[{"predecessorTaskId":"A","lagDays":1}]}]"#,
    )
    .unwrap();
    let plan = load_plan_from_json(file.path()).unwrap();
    assert_eq!(plan.metadata, ScheduleMetadata::default());
    assert_eq!(plan.tasks.len(), 2);
    assert_eq!(plan.tasks[1].predecessors[0].lag_days, 1);
}

#[test]
fn json_loader_rejects_duplicate_ids() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), r#"{"tasks":[{"id":"A"},{"id":"A"}]}"#).unwrap();
    match load_plan_from_json(file.path()) {
        Err(PersistenceError::InvalidTasks(TaskInputError::DuplicateId { id })) => {
            assert_eq!(id, "A")
        }
        other => panic!("expected duplicate id error, got {other:?}"),
    }
}

#[test]
fn csv_import_parses_typed_predecessors() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,name,wbs_code,duration_days,predecessors\n\
         A,Design,1.1,5,\n\
         B,Build,1.2,3,A:SS+2\n\
         C,,1.3,2,A;B:FF-1\n",
    )
    .unwrap();

    let tasks = load_tasks_from_csv(file.path()).unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2].name, "Unnamed");
    assert_eq!(
        tasks[2].predecessors,
        vec![
            PredecessorLink::finish_to_start("A"),
            PredecessorLink::new("B", RelationshipType::FF, -1),
        ]
    );

    let result = calculate(&tasks).unwrap();
    let c = result.task("C").unwrap();
    assert_eq!((c.early_start, c.early_finish), (6, 7));
    assert_eq!(result.project_duration, 7);
}

#[test]
fn csv_import_rejects_blank_ids() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,name,wbs_code,duration_days,predecessors\nA,Design,,1,\n ,Nameless,,1,\n",
    )
    .unwrap();
    match load_tasks_from_csv(file.path()) {
        Err(PersistenceError::InvalidTasks(TaskInputError::MissingId { index })) => {
            assert_eq!(index, 1)
        }
        other => panic!("expected missing id error, got {other:?}"),
    }
}

#[test]
fn csv_task_file_round_trip() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    save_tasks_to_csv(&plan.tasks, file.path()).unwrap();
    assert_eq!(load_tasks_from_csv(file.path()).unwrap(), plan.tasks);
}

#[test]
fn result_export_includes_calendar_dates_when_start_is_set() {
    let plan = build_sample_plan();
    let result = plan.calculate().unwrap();

    let mut buffer = Vec::new();
    write_result_csv(&result, &plan.metadata, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();

    assert_eq!(
        lines.next().unwrap(),
        "id,name,wbs_code,duration_days,early_start,early_finish,late_start,late_finish,\
         total_float,free_float,is_critical,early_start_date,early_finish_date,\
         late_start_date,late_finish_date"
    );
    assert_eq!(
        lines.next().unwrap(),
        "A,Design,1.1,5,1,5,1,5,0,0,true,2025-01-06,2025-01-10,2025-01-06,2025-01-10"
    );
}

#[test]
fn result_export_leaves_dates_blank_without_start() {
    let mut plan = build_sample_plan();
    plan.metadata.project_start_date = None;
    let result = plan.calculate().unwrap();

    let mut buffer = Vec::new();
    write_result_csv(&result, &plan.metadata, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let row = text.lines().nth(1).unwrap();
    assert!(row.starts_with("A,Design,1.1,5,1,5,"));
    assert!(row.ends_with(",true,,,,"));
}
