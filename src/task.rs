use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

/// How a dependency constrains the dependent task's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Finish-to-Start
    #[default]
    FS,
    /// Start-to-Start
    SS,
    /// Finish-to-Finish
    FF,
    /// Start-to-Finish
    SF,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::FS => "FS",
            RelationshipType::SS => "SS",
            RelationshipType::FF => "FF",
            RelationshipType::SF => "SF",
        }
    }

    /// Normalizes importer spellings (`finish_start`, `Finish-to-Start`, `ss`, ...).
    /// Anything unrecognised is treated as finish-to-start.
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_normalized(&normalize(value)).unwrap_or_default()
    }

    fn from_normalized(normalized: &str) -> Option<Self> {
        match normalized {
            "FS" | "FINISHSTART" | "FINISHTOSTART" => Some(RelationshipType::FS),
            "SS" | "STARTSTART" | "STARTTOSTART" => Some(RelationshipType::SS),
            "FF" | "FINISHFINISH" | "FINISHTOFINISH" => Some(RelationshipType::FF),
            "SF" | "STARTFINISH" | "STARTTOFINISH" => Some(RelationshipType::SF),
            _ => None,
        }
    }
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_normalized(&normalize(s))
            .ok_or_else(|| format!("unknown relationship type '{s}' (expected FS, SS, FF or SF)"))
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RelationshipType {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<RelationshipType> for String {
    fn from(value: RelationshipType) -> Self {
        value.as_str().to_string()
    }
}

/// A declared dependency on another task. `lag_days` may be negative (lead).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredecessorLink {
    #[serde(alias = "predecessorTaskId")]
    pub predecessor_id: String,
    #[serde(default)]
    pub relationship: RelationshipType,
    #[serde(default, deserialize_with = "deserialize_lag_days")]
    pub lag_days: i64,
}

impl PredecessorLink {
    pub fn new(
        predecessor_id: impl Into<String>,
        relationship: RelationshipType,
        lag_days: i64,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            relationship,
            lag_days,
        }
    }

    pub fn finish_to_start(predecessor_id: impl Into<String>) -> Self {
        Self::new(predecessor_id, RelationshipType::FS, 0)
    }
}

/// Caller-supplied task input. Only `id` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_task_name")]
    pub name: String,
    #[serde(default)]
    pub wbs_code: String,
    #[serde(default, deserialize_with = "deserialize_duration_days")]
    pub duration_days: u32,
    #[serde(default)]
    pub predecessors: Vec<PredecessorLink>,
}

pub(crate) fn default_task_name() -> String {
    "Unnamed".to_string()
}

impl TaskDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: default_task_name(),
            wbs_code: String::new(),
            duration_days: 0,
            predecessors: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_wbs_code(mut self, wbs_code: impl Into<String>) -> Self {
        self.wbs_code = wbs_code.into();
        self
    }

    pub fn with_duration(mut self, duration_days: u32) -> Self {
        self.duration_days = duration_days;
        self
    }

    pub fn with_predecessor(mut self, link: PredecessorLink) -> Self {
        self.predecessors.push(link);
        self
    }

    /// Shorthand for a zero-lag finish-to-start dependency.
    pub fn after(self, predecessor_id: impl Into<String>) -> Self {
        self.with_predecessor(PredecessorLink::finish_to_start(predecessor_id))
    }
}

/// Engine record: the descriptor plus computed dates (1-indexed day numbers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub wbs_code: String,
    pub duration_days: u32,
    pub predecessors: Vec<PredecessorLink>,
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
}

impl Task {
    pub fn from_descriptor(descriptor: &TaskDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            wbs_code: descriptor.wbs_code.clone(),
            duration_days: descriptor.duration_days,
            predecessors: descriptor.predecessors.clone(),
            early_start: 0,
            early_finish: 0,
            late_start: 0,
            late_finish: 0,
            total_float: 0,
            free_float: 0,
            is_critical: false,
        }
    }

    /// Days between a task's start and finish day numbers.
    pub fn span(&self) -> i64 {
        span_days(self.duration_days)
    }
}

/// `max(0, duration - 1)`: a 1-day task starts and finishes on the same day.
pub(crate) fn span_days(duration_days: u32) -> i64 {
    (i64::from(duration_days) - 1).max(0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DayCount {
    Whole(i64),
    Fractional(f64),
}

/// Largest magnitude accepted for a duration or lag, in days.
pub const MAX_DAY_COUNT: i64 = 100_000;

impl DayCount {
    fn into_days<E: de::Error>(self) -> Result<i64, E> {
        let days = match self {
            DayCount::Whole(days) if days.abs() <= MAX_DAY_COUNT => days,
            DayCount::Fractional(days) if days.is_finite() && days.abs() <= MAX_DAY_COUNT as f64 => {
                days.round() as i64
            }
            DayCount::Whole(days) => {
                return Err(E::custom(format!("day count {days} exceeds {MAX_DAY_COUNT}")));
            }
            DayCount::Fractional(days) => {
                return Err(E::custom(format!("day count {days} exceeds {MAX_DAY_COUNT}")));
            }
        };
        Ok(days)
    }
}

fn deserialize_lag_days<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    DayCount::deserialize(deserializer)?.into_days()
}

fn deserialize_duration_days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let days = DayCount::deserialize(deserializer)?.into_days::<D::Error>()?;
    u32::try_from(days)
        .map_err(|_| de::Error::custom(format!("durationDays must be a non-negative day count (got {days})")))
}
