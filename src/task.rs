//! Task records and their on-disk shape.
//!
//! A collection is a JSON array of records like
//!
//! ```json
//! {"description": "Buy milk", "category": "Nenhuma Selecionada", "priority": 2,
//!  "deadline_date": "Sem Data", "deadline_time": "Sem Horário", "_id": "01J..."}
//! ```
//!
//! Deadlines are RFC 3339 timestamps or a sentinel string. Anything that
//! parses as RFC 3339 or a bare `YYYY-MM-DD` date (surrounding whitespace
//! allowed) is rewritten as RFC 3339 UTC on the next write. Other strings are
//! kept verbatim.
//!
//! Collections are decoded record by record: a record that does not fit the
//! shape is logged and dropped, and its neighbours survive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Reserved category meaning "no category assigned".
pub const NO_CATEGORY: &str = "Nenhuma Selecionada";
/// Stored in `deadline_date` when the task has no date.
pub const NO_DATE: &str = "Sem Data";
/// Stored in `deadline_time` when the task has no time.
pub const NO_TIME: &str = "Sem Horário";
/// Shown for a blank description.
pub const NO_DESCRIPTION: &str = "Sem Descrição";
/// Shown for a blank category.
pub const BLANK_CATEGORY: &str = "Sem Categoria";
/// Default display width for descriptions and categories.
pub const DESCRIPTION_WIDTH: usize = 26;

/// Generate a fresh task id.
pub fn new_task_id() -> String {
    Ulid::new().to_string()
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Short label as shown next to a task.
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Média",
            Priority::Low => "Baixa",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(format!("invalid priority {other} (expected 1, 2 or 3)")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.rank()
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "high" | "alta" => Ok(Priority::High),
            "2" | "medium" | "media" | "média" => Ok(Priority::Medium),
            "3" | "low" | "baixa" => Ok(Priority::Low),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{raw}' (expected high|medium|low or 1|2|3)"
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Prioridade", self.label())
    }
}

/// A deadline component: unset, a timestamp, or a string we could not parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Moment {
    #[default]
    Unset,
    At(DateTime<Utc>),
    Unparsed(String),
}

impl Moment {
    pub fn at(value: Option<DateTime<Utc>>) -> Self {
        value.map(Moment::At).unwrap_or_default()
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Moment::At(value) => Some(*value),
            _ => None,
        }
    }

    fn from_wire(raw: Option<String>, sentinel: &str) -> Self {
        let Some(raw) = raw else {
            return Moment::Unset;
        };
        if raw == sentinel {
            return Moment::Unset;
        }
        match parse_timestamp(&raw) {
            Some(value) => Moment::At(value),
            None => Moment::Unparsed(raw),
        }
    }

    fn to_wire(&self, sentinel: &str) -> String {
        match self {
            Moment::Unset => sentinel.to_string(),
            Moment::At(value) => value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Moment::Unparsed(raw) => raw.clone(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

macro_rules! sentinel_moment_serde {
    ($module:ident, $sentinel:expr) => {
        mod $module {
            use super::*;

            pub fn serialize<S: Serializer>(
                value: &Moment,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&value.to_wire($sentinel))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Moment, D::Error> {
                let raw = Option::<String>::deserialize(deserializer)?;
                Ok(Moment::from_wire(raw, $sentinel))
            }
        }
    };
}

sentinel_moment_serde!(deadline_date_serde, NO_DATE);
sentinel_moment_serde!(deadline_time_serde, NO_TIME);

fn default_category() -> String {
    NO_CATEGORY.to_string()
}

/// A `null` category reads the same as a missing one.
fn category_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_category))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category", deserialize_with = "category_or_default")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "deadline_date_serde")]
    pub deadline_date: Moment,
    #[serde(default, with = "deadline_time_serde")]
    pub deadline_time: Moment,
    #[serde(rename = "_id", default)]
    pub id: String,
}

/// What the user submits when creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub deadline_date: Option<DateTime<Utc>>,
    pub deadline_time: Option<DateTime<Utc>>,
}

impl TaskInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn deadline_date(mut self, value: DateTime<Utc>) -> Self {
        self.deadline_date = Some(value);
        self
    }

    pub fn deadline_time(mut self, value: DateTime<Utc>) -> Self {
        self.deadline_time = Some(value);
        self
    }
}

impl Task {
    /// Build a record from user input. A blank category becomes [`NO_CATEGORY`].
    pub fn from_input(id: String, input: TaskInput, default_priority: Priority) -> Self {
        let category = match input.category {
            Some(category) if !category.trim().is_empty() => category,
            _ => default_category(),
        };
        Self {
            description: input.description,
            category,
            priority: input.priority.unwrap_or(default_priority),
            deadline_date: Moment::at(input.deadline_date),
            deadline_time: Moment::at(input.deadline_time),
            id,
        }
    }

    pub fn description_display(&self, width: usize) -> String {
        if self.description.trim().is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        truncate_chars(&self.description, width)
    }

    /// Category as stored; a category deleted since is still shown verbatim.
    pub fn category_display(&self, width: usize) -> String {
        if self.category.trim().is_empty() {
            return BLANK_CATEGORY.to_string();
        }
        truncate_chars(&self.category, width)
    }

    pub fn date_display(&self) -> Option<String> {
        self.deadline_date.datetime().map(format_date)
    }

    pub fn time_display(&self) -> Option<String> {
        self.deadline_time.datetime().map(format_time)
    }

    pub fn due_status(&self, today: NaiveDate) -> Option<DueStatus> {
        DueStatus::for_deadline(&self.deadline_date, today)
    }
}

/// Cut `value` to `max_chars` characters, appending `...` when shortened.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &value[..byte_idx]),
        None => value.to_string(),
    }
}

/// `d/m/yyyy`, in UTC.
pub fn format_date(value: DateTime<Utc>) -> String {
    format!("{}/{}/{}", value.day(), value.month(), value.year())
}

/// `h:mm AM/PM`, in UTC.
pub fn format_time(value: DateTime<Utc>) -> String {
    let (is_pm, hour) = value.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{}:{:02} {}", hour, value.minute(), suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Upcoming,
    DueToday,
    Overdue,
}

impl DueStatus {
    /// Compare the deadline's calendar day against `today`.
    pub fn for_deadline(deadline: &Moment, today: NaiveDate) -> Option<Self> {
        let day = deadline.datetime()?.date_naive();
        Some(match day.cmp(&today) {
            std::cmp::Ordering::Greater => DueStatus::Upcoming,
            std::cmp::Ordering::Equal => DueStatus::DueToday,
            std::cmp::Ordering::Less => DueStatus::Overdue,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            DueStatus::Upcoming => "upcoming",
            DueStatus::DueToday => "due today",
            DueStatus::Overdue => "overdue",
        }
    }
}

/// Parse a stored task collection.
///
/// Absent data or a document that is not a JSON array is an empty list.
/// Inside an array, records that do not decode are skipped with a warning.
pub fn decode_tasks(key: &str, raw: Option<&str>) -> Vec<Task> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let records = match serde_json::from_str::<Option<Vec<serde_json::Value>>>(raw) {
        Ok(records) => records.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                key,
                error = %err,
                "stored task collection is unreadable; treating as empty"
            );
            return Vec::new();
        }
    };
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(key, index, error = %err, "skipping unreadable task record");
                None
            }
        })
        .collect()
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Find a task by exact id, falling back to a unique case-insensitive prefix.
pub fn resolve_task<'a>(tasks: &'a [Task], input: &str) -> Result<&'a Task> {
    let needle = input.trim();
    if needle.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    if let Some(task) = tasks.iter().find(|task| task.id == needle) {
        return Ok(task);
    }

    let lowered = needle.to_ascii_lowercase();
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.id.to_ascii_lowercase().starts_with(&lowered))
        .collect();
    match matches.as_slice() {
        [] => Err(Error::TaskNotFound(needle.to_string())),
        [task] => Ok(*task),
        many => Err(Error::AmbiguousTaskId {
            input: needle.to_string(),
            matches: many.len(),
        }),
    }
}
