use std::io::{self, BufRead, Write};

use chrono::{NaiveDate, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::info;

use crate::date::{
    add_days, format_clock_time, format_date_title, format_week_range, parse_clock_time, parse_iso_date,
    to_iso_date, weekday_label, Locale,
};
use crate::error::{StoreError, TaskError};
use crate::models::{Priority, Tag, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::query::{group_day, week_stats, week_view};
use crate::storage::StateBackend;
use crate::store::TaskStore;

/// Resolves `today`, `tomorrow`, `yesterday` or an ISO date.
pub fn resolve_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, TaskError> {
    match raw.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(add_days(today, 1)),
        "yesterday" => Ok(add_days(today, -1)),
        _ => Ok(parse_iso_date(raw)?),
    }
}

/// Parses an optional `HH:mm`; empty or `none` clears the value.
pub fn parse_optional_time(raw: &str) -> Result<Option<NaiveTime>, TaskError> {
    match raw.trim().to_lowercase().as_str() {
        "" | "none" | "-" => Ok(None),
        _ => Ok(Some(parse_clock_time(raw)?)),
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, TaskError> {
    raw.parse().map_err(|_| TaskError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

/// Raw string input for a new task, as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct NewTaskInput {
    pub title: String,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub priority: Option<String>,
    pub tag: Option<String>,
}

impl NewTaskInput {
    /// Validates the input into a draft. A missing date means `today`.
    pub fn into_draft(self, today: NaiveDate) -> Result<TaskDraft, TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let date = match self.date {
            Some(d) => resolve_date(&d, today)?,
            None => today,
        };
        let start = self.start.as_deref().map(parse_optional_time).transpose()?.flatten();
        let end = self.end.as_deref().map(parse_optional_time).transpose()?.flatten();
        let mut draft = TaskDraft::new(self.title, date).with_times(start, end);
        draft.priority = self.priority.as_deref().map(|p| parse_field("priority", p)).transpose()?;
        draft.tag = self.tag.as_deref().map(|t| parse_field("tag", t)).transpose()?;
        Ok(draft)
    }
}

/// Raw string input for an edit. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct EditInput {
    pub title: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tag: Option<String>,
}

impl EditInput {
    /// Converts the input into a patch. `none` clears optional fields.
    pub fn into_patch(self, today: NaiveDate) -> Result<TaskPatch, TaskError> {
        let clearable = |raw: &str| matches!(raw.trim().to_lowercase().as_str(), "" | "none" | "-");
        Ok(TaskPatch {
            title: self.title,
            date: self.date.as_deref().map(|d| resolve_date(d, today)).transpose()?,
            start_time: self.start.as_deref().map(parse_optional_time).transpose()?,
            end_time: self.end.as_deref().map(parse_optional_time).transpose()?,
            status: self.status.as_deref().map(|s| parse_field::<TaskStatus>("status", s)).transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(|p| if clearable(p) { Ok(None) } else { parse_field::<Priority>("priority", p).map(Some) })
                .transpose()?,
            tag: self
                .tag
                .as_deref()
                .map(|t| if clearable(t) { Ok(None) } else { parse_field::<Tag>("tag", t).map(Some) })
                .transpose()?,
        })
    }
}

/// Adds a new task and returns its id.
pub fn cmd_add<B: StateBackend>(store: &mut TaskStore<B>, draft: TaskDraft, silent: bool) -> Result<String, TaskError> {
    let date = draft.date;
    let id = store.create(draft)?;
    info!(%id, date = %date, "task added");
    if !silent { println!("Task added (id = {}) on {}", id, to_iso_date(date)); }
    Ok(id)
}

/// Advances a task to the next status in the cycle.
pub fn cmd_cycle<B: StateBackend>(store: &mut TaskStore<B>, id: &str, silent: bool) -> Result<TaskStatus, TaskError> {
    let status = store.cycle_status(id)?;
    if !silent { println!("Task {} is now {}.", id, status); }
    Ok(status)
}

/// Edits an existing task's details.
pub fn cmd_edit<B: StateBackend>(store: &mut TaskStore<B>, id: &str, patch: &TaskPatch, silent: bool) -> Result<(), TaskError> {
    if patch.is_empty() {
        if !silent { println!("Nothing to change for task {}.", id); }
        return Ok(());
    }
    store.update(id, patch)?;
    if !silent { println!("Task {} updated.", id); }
    Ok(())
}

/// Asks a yes/no question on stdout and reads the answer from `input`.
pub fn confirm(prompt: &str, input: &mut impl BufRead) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Removes a task. Without `force` the user is asked to confirm first.
///
/// Returns the removed task, or `None` when the user declined.
pub fn cmd_remove<B: StateBackend>(
    store: &mut TaskStore<B>,
    id: &str,
    force: bool,
    input: &mut impl BufRead,
    silent: bool,
) -> Result<Option<Task>, TaskError> {
    let title = match store.find(id) {
        Some(t) => t.title.clone(),
        None => return Err(TaskError::NotFound(id.to_string())),
    };
    if !force && !confirm(&format!("Delete task '{}'? This cannot be undone.", title), input) {
        if !silent { println!("Aborted."); }
        return Ok(None);
    }
    let removed = store.delete(id)?;
    if !silent { println!("Task {} removed.", id); }
    Ok(Some(removed))
}

/// Forgets all saved tasks, after confirmation unless `force` is set.
pub fn cmd_reset<B: StateBackend>(
    store: &mut TaskStore<B>,
    force: bool,
    input: &mut impl BufRead,
    silent: bool,
) -> Result<bool, StoreError> {
    if !force && !confirm("Are you sure you want to delete all tasks? This cannot be undone.", input) {
        if !silent { println!("Aborted."); }
        return Ok(false);
    }
    store.reset()?;
    info!("tasks reset");
    if !silent { println!("Tasks reset successfully."); }
    Ok(true)
}

fn time_range(task: &Task) -> String {
    match (task.start_time, task.end_time) {
        (Some(s), Some(e)) => format!("{}-{}", format_clock_time(s), format_clock_time(e)),
        (Some(s), None) => format_clock_time(s),
        (None, Some(e)) => format!("-{}", format_clock_time(e)),
        (None, None) => "-".to_string(),
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Done => Color::Green,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Todo => Color::Reset,
    }
}

/// Renders the day view for `date` as a table grouped by time of day.
pub fn render_day(tasks: &[Task], date: NaiveDate, locale: Locale) -> String {
    let title = format_date_title(date, locale);
    let groups = group_day(tasks, date);
    if groups.is_empty() {
        return format!("{}\nNo tasks for this day.", title);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Section").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Tag").add_attribute(Attribute::Bold),
        ]);

    for group in &groups {
        for (i, t) in group.tasks.iter().enumerate() {
            let section = if i == 0 { group.section.label(locale) } else { "" };
            let mut title_cell = Cell::new(&t.title).fg(status_color(t.status));
            if t.is_done() {
                title_cell = title_cell.add_attribute(Attribute::CrossedOut);
            } else if t.is_high_priority() {
                title_cell = title_cell.fg(Color::Red).add_attribute(Attribute::Bold);
            }
            table.add_row(vec![
                Cell::new(section).add_attribute(Attribute::Bold),
                Cell::new(&t.id),
                Cell::new(time_range(t)),
                title_cell,
                Cell::new(format!("{} {}", t.status.marker(), t.status)).fg(status_color(t.status)),
                Cell::new(t.tag.map(|tag| tag.label(locale)).unwrap_or_default()),
            ]);
        }
    }

    format!("{}\n{table}", title)
}

/// Renders the seven-day view starting at `week_start`.
pub fn render_week(tasks: &[Task], week_start: NaiveDate, locale: Locale) -> String {
    let stats = week_stats(tasks, week_start);
    let header = format!(
        "{}  done {} / pending {} / total {}",
        format_week_range(week_start, locale),
        stats.done,
        stats.pending(),
        stats.total
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Done").add_attribute(Attribute::Bold),
            Cell::new("Tasks").add_attribute(Attribute::Bold),
        ]);

    for day in week_view(tasks, week_start) {
        let lines: Vec<String> = day
            .tasks
            .iter()
            .map(|t| format!("{} {} {}", t.status.marker(), time_range(t), t.title))
            .collect();
        let done_color = if day.stats.total > 0 && day.stats.done == day.stats.total {
            Color::Green
        } else {
            Color::Reset
        };
        table.add_row(vec![
            Cell::new(weekday_label(day.date, locale)),
            Cell::new(to_iso_date(day.date)),
            Cell::new(format!("{}/{}", day.stats.done, day.stats.total)).fg(done_color),
            Cell::new(if lines.is_empty() { "-".to_string() } else { lines.join("\n") }),
        ]);
    }

    format!("{}\n{table}", header)
}

/// Prints the day view for `date`.
pub fn cmd_day(tasks: &[Task], date: NaiveDate, locale: Locale) {
    println!("{}", render_day(tasks, date, locale));
}

/// Prints the week view starting at `week_start`.
pub fn cmd_week(tasks: &[Task], week_start: NaiveDate, locale: Locale) {
    println!("{}", render_week(tasks, week_start, locale));
}
