use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// Older records may carry `null` where a value is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Task struct, one record of the stored collection
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deadline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    None,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

/// The user-editable part of a task, as produced by the task form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub deadline: String,
    pub description: String,
}

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Today,
    Upcoming,
    Overdue,
}

/// Parses the date part of a stored deadline. Accepts `YYYY-MM-DD` as well as
/// full ISO timestamps written by older clients.
pub fn deadline_to_date(deadline: &str) -> Option<NaiveDate> {
    let deadline = deadline.trim();
    let prefix = deadline.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

impl Task {
    pub fn from_draft(draft: TaskDraft) -> Task {
        Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            priority: draft.priority,
            deadline: draft.deadline,
            description: draft.description,
            status: Status::Pending,
        }
    }

    pub fn deadline_date(&self) -> Option<NaiveDate> {
        deadline_to_date(&self.deadline)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn apply_draft(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.priority = draft.priority;
        self.deadline = draft.deadline;
        self.description = draft.description;
    }
}

impl Priority {
    // Order used by the form selector
    const CYCLE: [Priority; 4] = [Priority::None, Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "None",
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_token(token: &str) -> Option<Priority> {
        match token.to_ascii_lowercase().as_str() {
            "none" | "0" => Some(Priority::None),
            "high" | "1" => Some(Priority::High),
            "medium" | "med" | "2" => Some(Priority::Medium),
            "low" | "3" => Some(Priority::Low),
            _ => None,
        }
    }

    fn position(self) -> usize {
        Self::CYCLE.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn cycle_next(self) -> Priority {
        Self::CYCLE[(self.position() + 1) % Self::CYCLE.len()]
    }

    pub fn cycle_previous(self) -> Priority {
        let len = Self::CYCLE.len();
        Self::CYCLE[(self.position() + len - 1) % len]
    }
}

impl Status {
    pub fn toggled(self) -> Status {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Today, Tab::Upcoming, Tab::Overdue];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::Upcoming => "Upcoming",
            Tab::Overdue => "Overdue",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Today => 0,
            Tab::Upcoming => 1,
            Tab::Overdue => 2,
        }
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Tasks without a readable deadline sort before every date, so they
    /// are listed under Overdue.
    pub fn matches(self, deadline: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, deadline) {
            (Tab::Today, Some(date)) => date == today,
            (Tab::Upcoming, Some(date)) => date > today,
            (Tab::Overdue, Some(date)) => date < today,
            (Tab::Overdue, None) => true,
            (_, None) => false,
        }
    }
}
