use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::date::Locale;
use crate::error::TaskError;

pub use crate::status::TaskStatus;

/// Represents a single task in the todo list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Display title.
    pub title: String,
    /// The day the task belongs to.
    pub date: NaiveDate,
    /// Optional start time (`HH:mm`).
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// Optional end time (`HH:mm`). Not required to follow `start_time`.
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// Unrecognised values decode as `todo`.
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: TaskStatus,
    /// Unrecognised values decode as absent.
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Accepts the identifiers and the Chinese labels; anything else decodes as absent.
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Some(Priority::High)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}', expected normal or high", other)),
        }
    }
}

/// Closed set of task categories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    #[serde(alias = "工作")]
    Work,
    #[serde(alias = "进行中")]
    InProgress,
    #[serde(alias = "已完成")]
    Done,
    #[serde(alias = "学习")]
    Study,
    #[serde(alias = "高优先级")]
    HighPriority,
    #[serde(alias = "协作")]
    Collab,
    #[serde(alias = "复盘")]
    Review,
    #[serde(alias = "习惯")]
    Habit,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::Work,
        Tag::InProgress,
        Tag::Done,
        Tag::Study,
        Tag::HighPriority,
        Tag::Collab,
        Tag::Review,
        Tag::Habit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Work => "work",
            Tag::InProgress => "in_progress",
            Tag::Done => "done",
            Tag::Study => "study",
            Tag::HighPriority => "high_priority",
            Tag::Collab => "collab",
            Tag::Review => "review",
            Tag::Habit => "habit",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.as_str(),
            Locale::Zh => match self {
                Tag::Work => "工作",
                Tag::InProgress => "进行中",
                Tag::Done => "已完成",
                Tag::Study => "学习",
                Tag::HighPriority => "高优先级",
                Tag::Collab => "协作",
                Tag::Review => "复盘",
                Tag::Habit => "习惯",
            },
        }
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Tag::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted || t.label(Locale::Zh) == s.trim())
            .ok_or_else(|| format!("unknown tag '{}'", s))
    }
}

/// Data for a task that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub tag: Option<Tag>,
}

impl TaskDraft {
    /// A `todo` draft with only a title and a date.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            start_time: None,
            end_time: None,
            status: TaskStatus::Todo,
            priority: None,
            tag: None,
        }
    }

    pub fn with_times(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Turns the draft into a task with the given id.
    ///
    /// The title is trimmed; an empty title is rejected.
    pub fn into_task(self, id: String) -> Result<Task, TaskError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Task {
            id,
            title,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
            priority: self.priority,
            tag: self.tag,
        })
    }
}

/// Partial update of a task. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Option<Priority>>,
    pub tag: Option<Option<Tag>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Applies the patch in place. A blank title is ignored.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            let title = title.trim();
            if !title.is_empty() {
                task.title = title.to_string();
            }
        }
        if let Some(date) = self.date { task.date = date; }
        if let Some(start) = self.start_time { task.start_time = start; }
        if let Some(end) = self.end_time { task.end_time = end; }
        if let Some(status) = self.status { task.status = status; }
        if let Some(priority) = self.priority { task.priority = priority; }
        if let Some(tag) = self.tag { task.tag = tag; }
    }
}

/// Generates a fresh task id of the form `t-<ulid>`.
pub fn new_task_id() -> String {
    format!("t-{}", Ulid::new().to_string().to_lowercase())
}

/// Serde adapter for optional `HH:mm` strings. A value that is not a valid
/// time decodes as `None`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use crate::date::{format_clock_time, parse_clock_time};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_some(&format_clock_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(raw.as_ref().and_then(Value::as_str).and_then(|s| parse_clock_time(s).ok()))
    }
}

/// Decoders that turn unrecognised enum values into defaults instead of
/// failing the whole record.
mod lenient {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    use super::TaskStatus;

    fn parse<T: FromStr>(raw: Option<Value>) -> Option<T> {
        let value = raw?;
        let parsed = value.as_str().and_then(|s| s.parse().ok());
        if parsed.is_none() && !value.is_null() {
            debug!(%value, "ignoring unrecognised value");
        }
        parsed
    }

    pub fn optional<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(parse(Option::<Value>::deserialize(d)?))
    }

    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<TaskStatus, D::Error> {
        Ok(parse(Option::<Value>::deserialize(d)?).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn decodes_minimal_record() {
        let task: Task = serde_json::from_str(
            r#"{"id":"2","title":"Read","date":"2024-06-10","status":"todo","extra":42}"#,
        )
        .unwrap();
        assert_eq!(task.start_time, None);
        assert_eq!(task.priority, None);
        assert_eq!(task.tag, None);
    }

    #[test]
    fn uses_camel_case_time_fields() {
        let mut task = TaskDraft::new("Standup", day()).into_task("1".into()).unwrap();
        task.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["date"], "2024-06-10");
        assert!(json.get("endTime").is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = TaskDraft::new("   ", day()).into_task("x".into()).unwrap_err();
        assert_eq!(err, TaskError::EmptyTitle);
    }

    #[test]
    fn patch_clears_optional_fields_and_ignores_blank_title() {
        let mut task = TaskDraft::new("Gym", day())
            .with_times(NaiveTime::from_hms_opt(18, 0, 0), None)
            .into_task("1".into())
            .unwrap();
        let patch = TaskPatch {
            title: Some("  ".into()),
            start_time: Some(None),
            tag: Some(Some(Tag::Habit)),
            ..TaskPatch::default()
        };
        patch.apply(&mut task);
        assert_eq!(task.title, "Gym");
        assert_eq!(task.start_time, None);
        assert_eq!(task.tag, Some(Tag::Habit));
    }

    #[test]
    fn decodes_chinese_tag_labels() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t-9","title":"跑步","date":"2024-06-10","status":"todo","tag":"习惯","priority":"high"}"#,
        )
        .unwrap();
        assert_eq!(task.tag, Some(Tag::Habit));
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(serde_json::to_value(&task).unwrap()["tag"], "habit");
    }

    #[test]
    fn unrecognised_values_decode_as_absent() {
        let task: Task = serde_json::from_str(
            r#"{"id":"x","title":"Odd","date":"2024-06-10","status":"paused",
                "startTime":"9am","endTime":42,"priority":"urgent","tag":"chores"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.start_time, None);
        assert_eq!(task.end_time, None);
        assert_eq!(task.priority, None);
        assert_eq!(task.tag, None);
    }

    #[test]
    fn tags_parse_from_either_locale() {
        assert_eq!("high-priority".parse::<Tag>().unwrap(), Tag::HighPriority);
        assert_eq!("学习".parse::<Tag>().unwrap(), Tag::Study);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(new_task_id(), new_task_id());
    }
}
