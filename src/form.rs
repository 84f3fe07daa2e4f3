use crate::error::FormError;
use crate::models::{Priority, Task, TaskDraft};
use crate::parser::{parse_deadline, parse_task_input};
use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Priority,
    Deadline,
    Description,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Title,
        FormField::Priority,
        FormField::Deadline,
        FormField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Priority => "Priority",
            FormField::Deadline => "Deadline",
            FormField::Description => "Description",
        }
    }

    pub fn is_text(self) -> bool {
        self != FormField::Priority
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Contents of the create/edit popup.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub priority: Priority,
    pub deadline: String,
    pub description: String,
    pub active: FormField,
    /// Id of the task being edited, `None` when creating.
    pub editing_id: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            title: String::new(),
            priority: Priority::None,
            deadline: String::new(),
            description: String::new(),
            active: FormField::Title,
            editing_id: None,
        }
    }
}

impl TaskForm {
    pub fn for_task(task: &Task) -> TaskForm {
        TaskForm {
            title: task.title.clone(),
            priority: task.priority,
            deadline: task.deadline.clone(),
            description: task.description.clone(),
            active: FormField::Title,
            editing_id: Some(task.id.clone()),
        }
    }

    pub fn clear(&mut self) {
        *self = TaskForm::default();
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn next_field(&mut self) {
        let order = FormField::ORDER;
        self.active = order[(self.active.position() + 1) % order.len()];
    }

    pub fn previous_field(&mut self) {
        let order = FormField::ORDER;
        self.active = order[(self.active.position() + order.len() - 1) % order.len()];
    }

    fn active_text(&mut self) -> Option<&mut String> {
        match self.active {
            FormField::Title => Some(&mut self.title),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Description => Some(&mut self.description),
            FormField::Priority => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(text) = self.active_text() {
            text.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.active_text() {
            text.pop();
        }
    }

    pub fn value_of(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Priority => self.priority.label().to_string(),
            FormField::Deadline => self.deadline.clone(),
            FormField::Description => self.description.clone(),
        }
    }

    pub fn fields() -> [FormField; 4] {
        FormField::ORDER
    }

    /// Validates the form and turns it into a draft. Quick-add tokens in the
    /// title override the priority and deadline fields.
    pub fn to_draft(&self, today: NaiveDate) -> Result<TaskDraft, FormError> {
        let parsed = parse_task_input(&self.title, today);
        if parsed.title.is_empty() {
            return Err(FormError::EmptyTitle);
        }

        let deadline = match parsed.deadline {
            Some(date) => format_date(date),
            None if self.deadline.trim().is_empty() => String::new(),
            None => match parse_deadline(&self.deadline, today) {
                Some(date) => format_date(date),
                None => {
                    return Err(FormError::InvalidDeadline(
                        self.deadline.trim().to_string(),
                    ))
                }
            },
        };

        Ok(TaskDraft {
            title: parsed.title,
            priority: parsed.priority.unwrap_or(self.priority),
            deadline,
            description: self.description.trim_end().to_string(),
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_empty_title_rejected() {
        let form = TaskForm {
            title: "   ".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(form.to_draft(today()), Err(FormError::EmptyTitle));
    }

    #[test]
    fn test_title_of_only_tokens_rejected() {
        let form = TaskForm {
            title: "!high @today".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(form.to_draft(today()), Err(FormError::EmptyTitle));
    }

    #[test]
    fn test_invalid_deadline_rejected() {
        let form = TaskForm {
            title: "Plan trip".to_string(),
            deadline: "someday".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(
            form.to_draft(today()),
            Err(FormError::InvalidDeadline("someday".to_string()))
        );
    }

    #[test]
    fn test_out_of_range_deadline_rejected() {
        let form = TaskForm {
            title: "Plan trip".to_string(),
            deadline: "+999999999999999".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(
            form.to_draft(today()),
            Err(FormError::InvalidDeadline("+999999999999999".to_string()))
        );
    }

    #[test]
    fn test_draft_normalises_deadline() {
        let form = TaskForm {
            title: "Plan trip".to_string(),
            priority: Priority::Low,
            deadline: "tomorrow".to_string(),
            description: "Book hotel\n".to_string(),
            ..TaskForm::default()
        };
        let draft = form.to_draft(today()).unwrap();
        assert_eq!(draft.title, "Plan trip");
        assert_eq!(draft.priority, Priority::Low);
        assert_eq!(draft.deadline, "2026-10-20");
        assert_eq!(draft.description, "Book hotel");
    }

    #[test]
    fn test_title_tokens_override_fields() {
        let form = TaskForm {
            title: "Plan trip !high @2026-11-02".to_string(),
            priority: Priority::Low,
            deadline: "tomorrow".to_string(),
            ..TaskForm::default()
        };
        let draft = form.to_draft(today()).unwrap();
        assert_eq!(draft.title, "Plan trip");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.deadline, "2026-11-02");
    }

    #[test]
    fn test_empty_deadline_allowed() {
        let form = TaskForm {
            title: "Someday maybe".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(form.to_draft(today()).unwrap().deadline, "");
    }

    #[test]
    fn test_for_task_prefills_fields() {
        let task = Task {
            id: "42".to_string(),
            title: "Water plants".to_string(),
            priority: Priority::Medium,
            deadline: "2026-10-21".to_string(),
            description: "Balcony".to_string(),
            status: Status::Pending,
        };
        let form = TaskForm::for_task(&task);
        assert!(form.is_editing());
        assert_eq!(form.editing_id.as_deref(), Some("42"));
        assert_eq!(form.title, "Water plants");
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.deadline, "2026-10-21");
        assert_eq!(form.description, "Balcony");
    }

    #[test]
    fn test_typing_goes_to_active_text_field() {
        let mut form = TaskForm::default();
        form.push_char('a');
        form.next_field();
        assert_eq!(form.active, FormField::Priority);
        form.push_char('x');
        form.next_field();
        form.push_char('+');
        form.push_char('1');
        form.pop_char();
        assert_eq!(form.title, "a");
        assert_eq!(form.deadline, "+");
        assert_eq!(form.priority, Priority::None);
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = TaskForm::default();
        form.previous_field();
        assert_eq!(form.active, FormField::Description);
        form.next_field();
        assert_eq!(form.active, FormField::Title);
    }
}
