use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMetadata {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    #[serde(default)]
    pub manager: String,
    /// Calendar date of day 1. Day numbers stay the source of truth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_start_date: Option<NaiveDate>,
}

fn default_project_name() -> String {
    "New Project".to_string()
}

impl Default for ScheduleMetadata {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_description: String::new(),
            manager: String::new(),
            project_start_date: None,
        }
    }
}

impl ScheduleMetadata {
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.project_start_date = Some(start);
        self
    }

    /// Maps a 1-indexed day number to a date by plain day offset; no
    /// working-day calendar is applied.
    pub fn date_for_day(&self, day: i64) -> Option<NaiveDate> {
        let start = self.project_start_date?;
        let offset = TimeDelta::try_days(day.checked_sub(1)?)?;
        start.checked_add_signed(offset)
    }
}
