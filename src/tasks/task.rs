//! Task model types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How an overdue task is brought to its owner's attention.
///
/// Stored as its integer discriminant in the todo table, and selected in
/// the task-creation panel by label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemindType {
    /// No reminder; the task only shows up in listings.
    #[default]
    None,
    /// Mention the owner in the channel the task was created from.
    ChannelMention,
    /// Send the owner a direct message.
    DirectMessage,
}

impl RemindType {
    /// Integer value used in the todo table.
    pub fn as_i64(self) -> i64 {
        match self {
            RemindType::None => 0,
            RemindType::ChannelMention => 1,
            RemindType::DirectMessage => 2,
        }
    }

    /// Reverse of [`RemindType::as_i64`].
    pub fn from_i64(value: i64) -> Option<RemindType> {
        match value {
            0 => Some(RemindType::None),
            1 => Some(RemindType::ChannelMention),
            2 => Some(RemindType::DirectMessage),
            _ => None,
        }
    }

    /// Label shown in the reminder-type select.
    pub fn label(self) -> &'static str {
        match self {
            RemindType::None => "None",
            RemindType::ChannelMention => "Mention (this channel)",
            RemindType::DirectMessage => "Direct Message",
        }
    }

    /// Reverse of [`RemindType::label`], for select values coming back
    /// from the gateway.
    pub fn from_label(label: &str) -> Option<RemindType> {
        match label {
            "None" => Some(RemindType::None),
            "Mention (this channel)" => Some(RemindType::ChannelMention),
            "Direct Message" => Some(RemindType::DirectMessage),
            _ => None,
        }
    }
}

/// A persisted todo task.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub task_id: i64,
    pub user_id: i64,
    /// Task text, unique per owning user.
    pub task: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub remind_type: RemindType,
    pub datetime_created: NaiveDateTime,
}

impl Task {
    /// The instant this task falls due, or `None` when it has neither a
    /// date nor a time.
    ///
    /// A task with only a time is due today at that time; a task with
    /// only a date is due at midnight starting that date.
    pub fn due_instant(&self, today: NaiveDate) -> Option<NaiveDateTime> {
        match (self.date, self.time) {
            (None, None) => None,
            (date, time) => Some(
                date.unwrap_or(today)
                    .and_time(time.unwrap_or(NaiveTime::MIN)),
            ),
        }
    }

    /// Human description of the due date/time, or `None` when unset.
    pub fn due_description(&self) -> Option<String> {
        match (self.date, self.time) {
            (None, None) => None,
            (None, Some(time)) => Some(time.format("%I:%M %p").to_string()),
            (Some(date), None) => Some(date.format("%B %d").to_string()),
            (Some(date), Some(time)) => Some(format!(
                "{} at {}",
                date.format("%B %d, %Y"),
                time.format("%I:%M %p")
            )),
        }
    }
}

/// Form state accumulated by the task-creation panel before submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub text: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub remind_type: RemindType,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        TaskDraft {
            text: text.into(),
            ..TaskDraft::default()
        }
    }
}
