use cpm_engine::{PredecessorLink, RelationshipType, Task, TaskDescriptor};
use serde_json::json;

#[test]
fn descriptor_fields_default_when_absent() {
    let task: TaskDescriptor = serde_json::from_value(json!({ "id": "A" })).unwrap();
    assert_eq!(task.id, "A");
    assert_eq!(task.name, "Unnamed");
    assert_eq!(task.wbs_code, "");
    assert_eq!(task.duration_days, 0);
    assert!(task.predecessors.is_empty());
}

#[test]
fn missing_id_deserializes_as_blank() {
    let task: TaskDescriptor = serde_json::from_value(json!({ "name": "No id" })).unwrap();
    assert!(task.id.is_empty());
}

#[test]
fn importer_link_shape_is_accepted() {
    let task: TaskDescriptor = serde_json::from_value(json!({
        "id": "B",
        "durationDays": 2.4,
        "predecessors": [
            { "predecessorTaskId": "A", "relationship": "FINISH_START", "lagDays": 1.6 },
            { "predecessorId": "C", "relationship": "start_start" },
            { "predecessorId": "D" }
        ]
    }))
    .unwrap();

    assert_eq!(task.duration_days, 2);
    assert_eq!(
        task.predecessors,
        vec![
            PredecessorLink::new("A", RelationshipType::FS, 2),
            PredecessorLink::new("C", RelationshipType::SS, 0),
            PredecessorLink::finish_to_start("D"),
        ]
    );
}

#[test]
fn negative_duration_is_rejected() {
    let parsed = serde_json::from_value::<TaskDescriptor>(json!({ "id": "A", "durationDays": -3 }));
    assert!(parsed.is_err());
}

#[test]
fn negative_lag_is_kept() {
    let link: PredecessorLink =
        serde_json::from_value(json!({ "predecessorId": "A", "relationship": "FF", "lagDays": -2 }))
            .unwrap();
    assert_eq!(link.lag_days, -2);
    assert_eq!(link.relationship, RelationshipType::FF);
}

#[test]
fn computed_task_serializes_camel_case() {
    let task = Task::from_descriptor(
        &TaskDescriptor::new("A")
            .with_wbs_code("1.1")
            .with_predecessor(PredecessorLink::new("Z", RelationshipType::SS, 1)),
    );
    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["wbsCode"], "1.1");
    assert_eq!(value["earlyStart"], 0);
    assert_eq!(value["isCritical"], false);
    assert_eq!(value["predecessors"][0]["relationship"], "SS");
    assert_eq!(value["predecessors"][0]["predecessorId"], "Z");
}

#[test]
fn out_of_range_lag_is_rejected_at_input() {
    let parsed = serde_json::from_str::<Vec<TaskDescriptor>>(
        r#"[{"id":"A","durationDays":2},
            {"id":"B","durationDays":1,
             "predecessors":[{"predecessorId":"A","relationship":"FS","lagDays":1e300}]}]"#,
    );
    assert!(parsed.is_err());

    let parsed = serde_json::from_value::<PredecessorLink>(
        json!({ "predecessorId": "A", "lagDays": i64::MAX }),
    );
    assert!(parsed.is_err());
}

#[test]
fn lag_at_the_limit_still_calculates() {
    let tasks: Vec<TaskDescriptor> = serde_json::from_value(json!([
        { "id": "A", "durationDays": 2 },
        { "id": "B", "durationDays": 1,
          "predecessors": [{ "predecessorId": "A", "lagDays": cpm_engine::task::MAX_DAY_COUNT }] }
    ]))
    .unwrap();
    let result = cpm_engine::calculate(&tasks).unwrap();
    assert_eq!(result.project_duration, 2 + cpm_engine::task::MAX_DAY_COUNT + 1);
}
