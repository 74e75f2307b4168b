use chrono::NaiveDate;
use ratatui::widgets::TableState;

use crate::commands::parse_optional_time;
use crate::date::Locale;
use crate::models::{Task, TaskDraft, TaskPatch};
use crate::query::{group_day, week_view, Selection, ViewMode};
use crate::storage::StateBackend;
use crate::store::TaskStore;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Adding,
    EditingTitle,
    ConfirmDelete,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub start: Option<String>,
    pub step: usize, // 0: Title, 1: Start, 2: End
}

pub struct App<B: StateBackend> {
    pub store: TaskStore<B>,
    pub selection: Selection,
    pub today: NaiveDate,
    pub locale: Locale,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub target_id: Option<String>,
    /// Last error or notice, shown in the help bar.
    pub message: Option<String>,
}

impl<B: StateBackend> App<B> {
    /// Creates the app around an already constructed store.
    pub fn new(store: TaskStore<B>, today: NaiveDate, monday_first: bool, locale: Locale) -> App<B> {
        let mut app = App {
            store,
            selection: Selection::new(today, monday_first),
            today,
            locale,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            target_id: None,
            message: None,
        };
        app.clamp_selection();
        app
    }

    /// Tasks in display order for the current view.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let tasks = self.store.tasks();
        match self.selection.mode {
            ViewMode::Day => group_day(tasks, self.selection.date)
                .into_iter()
                .flat_map(|g| g.tasks)
                .collect(),
            ViewMode::Week => week_view(tasks, self.selection.week_start())
                .into_iter()
                .flat_map(|d| d.tasks)
                .collect(),
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let i = self.state.selected()?;
        self.visible_tasks().get(i).copied()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Keeps the table selection inside the visible list.
    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next task in the current list.
    pub fn next(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task in the current list.
    pub fn previous(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Cycles the status of the selected task, keeping it selected.
    pub fn cycle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            match self.store.cycle_status(&id) {
                Ok(_) => self.reselect(&id),
                Err(e) => self.message = Some(e.to_string()),
            }
        }
    }

    fn reselect(&mut self, id: &str) {
        let pos = self.visible_tasks().iter().position(|t| t.id == id);
        if pos.is_some() {
            self.state.select(pos);
        }
        self.clamp_selection();
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_id() {
            self.target_id = Some(id);
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    /// Answers the delete confirmation.
    pub fn confirm_delete(&mut self, yes: bool) {
        if let (true, Some(id)) = (yes, self.target_id.take()) {
            if let Err(e) = self.store.delete(&id) {
                self.message = Some(e.to_string());
            }
        }
        self.target_id = None;
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn shift_days(&mut self, days: i64) {
        self.selection.shift_days(days);
        self.state.select(None);
        self.clamp_selection();
    }

    pub fn change_week(&mut self, offset: i64) {
        self.selection.change_week(offset);
        self.state.select(None);
        self.clamp_selection();
    }

    pub fn go_today(&mut self) {
        self.selection.select_date(self.today);
        self.state.select(None);
        self.clamp_selection();
    }

    /// Switches between the day and week views.
    pub fn toggle_view(&mut self) {
        self.selection.toggle_mode();
        self.state.select(None);
        self.clamp_selection();
    }

    /// Initiates the "Add Task" wizard for the selected date.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.message = None;
    }

    /// Starts editing the title of the selected task.
    pub fn start_edit_title(&mut self) {
        if let Some(t) = self.selected_task() {
            let (id, title) = (t.id.clone(), t.title.clone());
            self.target_id = Some(id);
            self.input_buffer = title;
            self.input_mode = InputMode::EditingTitle;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.target_id = None;
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::EditingTitle => self.handle_editing_input(),
            _ => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => { // Title
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.title = self.input_buffer.trim().to_string();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Start
                match parse_optional_time(&self.input_buffer) {
                    Ok(_) => {
                        self.add_state.start = Some(self.input_buffer.clone());
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                        self.message = None;
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            2 => { // End
                let start = self.add_state.start.as_deref().map(parse_optional_time);
                let end = parse_optional_time(&self.input_buffer);
                match (start, end) {
                    (Some(Err(e)), _) | (_, Err(e)) => self.message = Some(e.to_string()),
                    (start, Ok(end)) => {
                        let start = start.and_then(Result::ok).flatten();
                        let draft = TaskDraft::new(self.add_state.title.clone(), self.selection.date)
                            .with_times(start, end);
                        match self.store.create(draft) {
                            Ok(id) => {
                                self.input_mode = InputMode::Normal;
                                self.input_buffer.clear();
                                self.reselect(&id);
                            }
                            Err(e) => self.message = Some(e.to_string()),
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Applies the edited title. A blank title leaves the task unchanged.
    fn handle_editing_input(&mut self) {
        if let Some(id) = self.target_id.take() {
            let patch = TaskPatch {
                title: Some(self.input_buffer.clone()),
                ..TaskPatch::default()
            };
            if let Err(e) = self.store.update(&id, &patch) {
                self.message = Some(e.to_string());
            }
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }
}
