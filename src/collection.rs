//! Whole-collection operations. Every mutation returns a fresh `Vec<Task>`
//! so the caller can upload it first and only then replace its state.

use crate::models::{Tab, Task, TaskDraft};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn tasks_for_tab(tasks: &[Task], tab: Tab, today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| !task.is_completed())
        .filter(|task| tab.matches(task.deadline_date(), today))
        .collect()
}

pub fn completed_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_completed()).collect()
}

pub fn with_task_added(tasks: &[Task], task: Task) -> Vec<Task> {
    let mut updated = tasks.to_vec();
    updated.push(task);
    updated
}

pub fn with_task_updated(tasks: &[Task], id: &str, draft: TaskDraft) -> Vec<Task> {
    let mut updated = tasks.to_vec();
    if let Some(task) = updated.iter_mut().find(|task| task.id == id) {
        task.apply_draft(draft);
    }
    updated
}

pub fn with_status_toggled(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.id == id {
                task.status = task.status.toggled();
            }
            task
        })
        .collect()
}

pub fn without_task(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|task| task.id != id).cloned().collect()
}

pub fn duplicate_ids(tasks: &[Task]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for task in tasks {
        if !seen.insert(task.id.as_str()) && !duplicates.contains(&task.id.as_str()) {
            duplicates.push(task.id.as_str());
        }
    }
    duplicates
}
