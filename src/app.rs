use crate::api::TaskStore;
use crate::collection::{
    completed_tasks, tasks_for_tab, today, with_status_toggled, with_task_added,
    with_task_updated, without_task,
};
use crate::error::ApiError;
use crate::form::{FormField, TaskForm};
use crate::models::{Tab, Task};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;

pub struct App {
    pub tasks: Vec<Task>,
    pub tab: Tab,
    pub focus: Focus,
    pub pending_state: ListState,
    pub completed_state: ListState,
    pub input_mode: InputMode,
    pub form: TaskForm,
    pub today: NaiveDate,
    pub status: Option<String>,
    /// False until the collection has been read once; writes are refused
    /// before that so an empty list never replaces the stored one.
    pub loaded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Insert,
    ConfirmDelete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Pending,
    Completed,
}

fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 || i > len - 1 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

impl App {
    pub fn new(tasks: Vec<Task>, tab: Tab) -> App {
        App::with_today(tasks, tab, today())
    }

    pub fn with_today(tasks: Vec<Task>, tab: Tab, today: NaiveDate) -> App {
        let mut app = App {
            tasks,
            tab,
            focus: Focus::Pending,
            pending_state: ListState::default(),
            completed_state: ListState::default(),
            input_mode: InputMode::Normal,
            form: TaskForm::default(),
            today,
            status: None,
            loaded: true,
        };
        app.clamp_selection();
        app
    }

    pub fn pending_view(&self) -> Vec<&Task> {
        tasks_for_tab(&self.tasks, self.tab, self.today)
    }

    pub fn completed_view(&self) -> Vec<&Task> {
        completed_tasks(&self.tasks)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        match self.focus {
            Focus::Pending => self
                .pending_state
                .selected()
                .and_then(|i| self.pending_view().get(i).copied()),
            Focus::Completed => self
                .completed_state
                .selected()
                .and_then(|i| self.completed_view().get(i).copied()),
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|task| task.id.clone())
    }

    fn clamp_selection(&mut self) {
        let pending = self.pending_view().len();
        let completed = self.completed_view().len();
        clamp(&mut self.pending_state, pending);
        clamp(&mut self.completed_state, completed);
    }

    pub fn next(&mut self) {
        match self.focus {
            Focus::Pending => {
                let len = self.pending_view().len();
                step(&mut self.pending_state, len, true);
            }
            Focus::Completed => {
                let len = self.completed_view().len();
                step(&mut self.completed_state, len, true);
            }
        }
    }

    pub fn previous(&mut self) {
        match self.focus {
            Focus::Pending => {
                let len = self.pending_view().len();
                step(&mut self.pending_state, len, false);
            }
            Focus::Completed => {
                let len = self.completed_view().len();
                step(&mut self.completed_state, len, false);
            }
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.pending_state.select(None);
            self.clamp_selection();
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Pending => Focus::Completed,
            Focus::Completed => Focus::Pending,
        };
    }

    pub fn open_new_form(&mut self) {
        self.form.clear();
        self.input_mode = InputMode::Editing;
    }

    pub fn open_edit_form(&mut self) {
        if let Some(task) = self.selected_task() {
            self.form = TaskForm::for_task(task);
            self.input_mode = InputMode::Editing;
        }
    }

    fn close_form(&mut self) {
        self.form.clear();
        self.input_mode = InputMode::Normal;
    }

    fn report(&mut self, context: &str, err: &ApiError) {
        log::error!("{}: {}", context, err);
        self.status = Some(format!("{}: {}", context, err));
    }

    // Uploads `updated` and adopts it only once the store accepted it.
    async fn commit<S: TaskStore + ?Sized>(
        &mut self,
        store: &S,
        updated: Vec<Task>,
    ) -> Result<(), ApiError> {
        if !self.loaded {
            return Err(ApiError::NotLoaded);
        }
        store.save_tasks(&updated).await?;
        self.tasks = updated;
        self.clamp_selection();
        Ok(())
    }

    pub async fn refresh_tasks<S: TaskStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), ApiError> {
        let tasks = store.fetch_tasks().await?;
        for id in crate::collection::duplicate_ids(&tasks) {
            log::warn!("task id {} appears more than once in the collection", id);
        }
        self.tasks = tasks;
        self.loaded = true;
        self.today = today();
        self.clamp_selection();
        Ok(())
    }

    pub async fn toggle_selected<S: TaskStore + ?Sized>(&mut self, store: &S) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let updated = with_status_toggled(&self.tasks, &id);
        match self.commit(store, updated).await {
            Ok(()) => {
                log::info!("toggled status of task {}", id);
                self.status = None;
            }
            Err(err) => self.report("Error updating task", &err),
        }
    }

    pub async fn delete_selected<S: TaskStore + ?Sized>(&mut self, store: &S) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let updated = without_task(&self.tasks, &id);
        match self.commit(store, updated).await {
            Ok(()) => {
                log::info!("deleted task {}", id);
                self.status = Some("Task deleted".to_string());
            }
            Err(err) => self.report("Error deleting task", &err),
        }
    }

    pub async fn submit_form<S: TaskStore + ?Sized>(&mut self, store: &S) {
        let draft = match self.form.to_draft(self.today) {
            Ok(draft) => draft,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };

        let updated = match &self.form.editing_id {
            Some(id) => with_task_updated(&self.tasks, id, draft),
            None => with_task_added(&self.tasks, Task::from_draft(draft)),
        };

        match self.commit(store, updated).await {
            Ok(()) => {
                log::info!("saved task ({} in collection)", self.tasks.len());
                self.status = Some("Task saved".to_string());
                self.close_form();
            }
            Err(err) => self.report("Error saving task", &err),
        }
    }

    pub async fn handle_input<S: TaskStore + ?Sized>(&mut self, key: KeyEvent, store: &S) -> bool {
        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') | KeyCode::Down => self.next(),
                KeyCode::Char('k') | KeyCode::Up => self.previous(),
                KeyCode::Char('l') | KeyCode::Right => self.select_tab(self.tab.next()),
                KeyCode::Char('h') | KeyCode::Left => self.select_tab(self.tab.previous()),
                KeyCode::Char('1') => self.select_tab(Tab::Today),
                KeyCode::Char('2') => self.select_tab(Tab::Upcoming),
                KeyCode::Char('3') => self.select_tab(Tab::Overdue),
                KeyCode::Tab => self.toggle_focus(),
                KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(store).await,
                KeyCode::Char('a') => self.open_new_form(),
                KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
                KeyCode::Char('d') => {
                    if self.selected_task().is_some() {
                        self.input_mode = InputMode::ConfirmDelete;
                    }
                }
                KeyCode::Char('r') => match self.refresh_tasks(store).await {
                    Ok(()) => self.status = Some("Tasks reloaded".to_string()),
                    Err(err) => self.report("Error fetching tasks", &err),
                },
                _ => {}
            },

            InputMode::ConfirmDelete => {
                match key.code {
                    KeyCode::Char('y') => self.delete_selected(store).await,
                    KeyCode::Char('n') | KeyCode::Esc => {}
                    _ => return false,
                }
                self.input_mode = InputMode::Normal;
            }

            InputMode::Editing => match key.code {
                KeyCode::Char('i') if self.form.active.is_text() => {
                    self.input_mode = InputMode::Insert;
                }
                KeyCode::Tab | KeyCode::Down => self.form.next_field(),
                KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
                KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ')
                    if self.form.active == FormField::Priority =>
                {
                    self.form.priority = self.form.priority.cycle_next();
                }
                KeyCode::Char('h') | KeyCode::Left if self.form.active == FormField::Priority => {
                    self.form.priority = self.form.priority.cycle_previous();
                }
                KeyCode::Enter => self.submit_form(store).await,
                KeyCode::Esc => {
                    self.close_form();
                    self.status = None;
                }
                _ => {}
            },

            InputMode::Insert => match key.code {
                KeyCode::Char(c) => self.form.push_char(c),
                KeyCode::Backspace => self.form.pop_char(),
                KeyCode::Esc => {
                    self.input_mode = InputMode::Editing;
                }
                _ => {}
            },
        }
        false
    }
}
