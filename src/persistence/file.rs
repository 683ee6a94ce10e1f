use super::{PersistenceError, PersistenceResult};
use crate::metadata::ScheduleMetadata;
use crate::project::ProjectPlan;
use crate::result::CpmResult;
use crate::task::{
    MAX_DAY_COUNT, PredecessorLink, RelationshipType, TaskDescriptor, default_task_name,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A JSON plan file is either a full snapshot or a bare task list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanDocument {
    Tasks(Vec<TaskDescriptor>),
    Plan(ProjectPlan),
}

impl PlanDocument {
    fn into_plan(self) -> ProjectPlan {
        match self {
            PlanDocument::Tasks(tasks) => ProjectPlan::with_tasks(ScheduleMetadata::default(), tasks),
            PlanDocument::Plan(plan) => plan,
        }
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &ProjectPlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectPlan> {
    let file = File::open(path)?;
    let document: PlanDocument = serde_json::from_reader(file)?;
    let plan = document.into_plan();
    super::validate_plan(&plan)?;
    Ok(plan)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    wbs_code: String,
    #[serde(default)]
    duration_days: String,
    #[serde(default)]
    predecessors: String,
}

impl From<&TaskDescriptor> for TaskCsvRecord {
    fn from(task: &TaskDescriptor) -> Self {
        TaskCsvRecord {
            id: task.id.clone(),
            name: task.name.clone(),
            wbs_code: task.wbs_code.clone(),
            duration_days: task.duration_days.to_string(),
            predecessors: format_predecessor_list(&task.predecessors),
        }
    }
}

impl TaskCsvRecord {
    fn into_descriptor(self) -> PersistenceResult<TaskDescriptor> {
        let name = if self.name.trim().is_empty() {
            default_task_name()
        } else {
            self.name
        };
        Ok(TaskDescriptor {
            id: self.id.trim().to_string(),
            name,
            wbs_code: self.wbs_code,
            duration_days: parse_duration(&self.duration_days)?,
            predecessors: parse_predecessor_list(&self.predecessors)?,
        })
    }
}

/// Reads `id,name,wbs_code,duration_days,predecessors` rows. Metadata is not
/// part of the CSV format.
pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskDescriptor>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_descriptor()?);
    }
    crate::task_validation::validate_descriptors(&tasks)?;
    Ok(tasks)
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[TaskDescriptor], path: P) -> PersistenceResult<()> {
    crate::task_validation::validate_descriptors(tasks)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ResultCsvRow<'a> {
    id: &'a str,
    name: &'a str,
    wbs_code: &'a str,
    duration_days: u32,
    early_start: i64,
    early_finish: i64,
    late_start: i64,
    late_finish: i64,
    total_float: i64,
    free_float: i64,
    is_critical: bool,
    early_start_date: Option<NaiveDate>,
    early_finish_date: Option<NaiveDate>,
    late_start_date: Option<NaiveDate>,
    late_finish_date: Option<NaiveDate>,
}

/// Writes one row per computed task. Date columns stay empty unless the
/// metadata carries a project start date.
pub fn write_result_csv<W: Write>(
    result: &CpmResult,
    metadata: &ScheduleMetadata,
    writer: W,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for task in &result.tasks {
        writer.serialize(ResultCsvRow {
            id: &task.id,
            name: &task.name,
            wbs_code: &task.wbs_code,
            duration_days: task.duration_days,
            early_start: task.early_start,
            early_finish: task.early_finish,
            late_start: task.late_start,
            late_finish: task.late_finish,
            total_float: task.total_float,
            free_float: task.free_float,
            is_critical: task.is_critical,
            early_start_date: metadata.date_for_day(task.early_start),
            early_finish_date: metadata.date_for_day(task.early_finish),
            late_start_date: metadata.date_for_day(task.late_start),
            late_finish_date: metadata.date_for_day(task.late_finish),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_result_to_csv<P: AsRef<Path>>(
    result: &CpmResult,
    metadata: &ScheduleMetadata,
    path: P,
) -> PersistenceResult<()> {
    write_result_csv(result, metadata, File::create(path)?)
}

/// Parses `A;B:SS+2;C:FF-1`. A bare id is a zero-lag FS link.
pub fn parse_predecessor_list(input: &str) -> PersistenceResult<Vec<PredecessorLink>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_predecessor)
        .collect()
}

fn parse_predecessor(part: &str) -> PersistenceResult<PredecessorLink> {
    let Some((id, constraint)) = part.split_once(':') else {
        return Ok(PredecessorLink::finish_to_start(part));
    };
    let id = id.trim();
    if id.is_empty() {
        return Err(PersistenceError::InvalidData(format!(
            "predecessor '{part}' has no id"
        )));
    }

    let constraint = constraint.trim();
    let (relationship, lag) = match lag_sign_position(constraint) {
        Some(pos) => (&constraint[..pos], &constraint[pos..]),
        None => (constraint, ""),
    };
    let relationship = if relationship.trim().is_empty() {
        RelationshipType::FS
    } else {
        relationship
            .parse::<RelationshipType>()
            .map_err(PersistenceError::InvalidData)?
    };
    Ok(PredecessorLink::new(id, relationship, parse_lag(lag)?))
}

/// Position of the `+`/`-` that starts the lag. Hyphens inside spelled-out
/// relationship names (`Finish-to-Start`) are followed by letters, not digits.
fn lag_sign_position(constraint: &str) -> Option<usize> {
    let bytes = constraint.as_bytes();
    (0..bytes.len()).find(|&pos| {
        matches!(bytes[pos], b'+' | b'-')
            && bytes.get(pos + 1).is_some_and(|next| next.is_ascii_digit() || *next == b'.')
    })
}

pub fn format_predecessor_list(links: &[PredecessorLink]) -> String {
    links
        .iter()
        .map(|link| match (link.relationship, link.lag_days) {
            (RelationshipType::FS, 0) => link.predecessor_id.clone(),
            (relationship, 0) => format!("{}:{relationship}", link.predecessor_id),
            (relationship, lag) => format!("{}:{relationship}{lag:+}", link.predecessor_id),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn parse_day_count(input: &str, field: &str) -> PersistenceResult<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    let days = match input.parse::<f64>() {
        Ok(days) if days.is_finite() => days,
        _ => {
            return Err(PersistenceError::InvalidData(format!(
                "invalid {field} '{input}'"
            )));
        }
    };
    if days.abs() > MAX_DAY_COUNT as f64 {
        return Err(PersistenceError::InvalidData(format!(
            "{field} '{input}' exceeds {MAX_DAY_COUNT} days"
        )));
    }
    Ok(days.round() as i64)
}

fn parse_lag(input: &str) -> PersistenceResult<i64> {
    parse_day_count(input, "lag")
}

fn parse_duration(input: &str) -> PersistenceResult<u32> {
    let days = parse_day_count(input, "duration_days")?;
    u32::try_from(days).map_err(|_| {
        PersistenceError::InvalidData(format!("duration_days must be non-negative (got {days})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_links_with_lag_and_lead() {
        let links = parse_predecessor_list("A; B:SS+2 ;C:FF-1;D:sf").unwrap();
        assert_eq!(
            links,
            vec![
                PredecessorLink::finish_to_start("A"),
                PredecessorLink::new("B", RelationshipType::SS, 2),
                PredecessorLink::new("C", RelationshipType::FF, -1),
                PredecessorLink::new("D", RelationshipType::SF, 0),
            ]
        );
    }

    #[test]
    fn lag_without_type_defaults_to_finish_to_start() {
        let links = parse_predecessor_list("A:+3").unwrap();
        assert_eq!(links, vec![PredecessorLink::new("A", RelationshipType::FS, 3)]);
    }

    #[test]
    fn spelled_out_relationship_keeps_its_hyphens() {
        let links = parse_predecessor_list("A:Finish-to-Start+2;B:start-to-start-1").unwrap();
        assert_eq!(
            links,
            vec![
                PredecessorLink::new("A", RelationshipType::FS, 2),
                PredecessorLink::new("B", RelationshipType::SS, -1),
            ]
        );
    }

    #[test]
    fn lag_beyond_the_day_limit_is_rejected() {
        assert!(parse_predecessor_list("A:FS+1e300").is_err());
        assert!(parse_predecessor_list("A:FS+9223372036854775807").is_err());
        assert!(parse_duration("100001").is_err());
    }

    #[test]
    fn rejects_unknown_relationship_codes() {
        assert!(parse_predecessor_list("A:XY+1").is_err());
        assert!(parse_predecessor_list(":SS").is_err());
    }

    #[test]
    fn formats_in_the_same_shape_it_parses() {
        let links = vec![
            PredecessorLink::finish_to_start("A"),
            PredecessorLink::new("B", RelationshipType::SS, 2),
            PredecessorLink::new("C", RelationshipType::FF, -1),
            PredecessorLink::new("D", RelationshipType::FS, 4),
        ];
        assert_eq!(format_predecessor_list(&links), "A;B:SS+2;C:FF-1;D:FS+4");
        assert_eq!(format_predecessor_list(&[]), "");
    }

    #[test]
    fn duration_accepts_fractions_and_rejects_negatives() {
        assert_eq!(parse_duration("2.6").unwrap(), 3);
        assert_eq!(parse_duration("").unwrap(), 0);
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("abc").is_err());
    }
}
