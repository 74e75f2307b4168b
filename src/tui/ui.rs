use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::date::{format_clock_time, format_date_title, format_week_range, weekday_label};
use crate::models::{Task, TaskStatus};
use crate::query::{day_stats, group_day, week_stats, week_view, ViewMode};
use crate::storage::StateBackend;
use super::app::{App, InputMode};

fn task_style(t: &Task) -> Style {
    match t.status {
        TaskStatus::Done => Style::default().fg(Color::Green).add_modifier(Modifier::CROSSED_OUT),
        TaskStatus::InProgress => Style::default().fg(Color::Blue),
        TaskStatus::Todo if t.is_high_priority() => Style::default().fg(Color::Red),
        TaskStatus::Todo => Style::default(),
    }
}

fn time_cell(t: &Task) -> String {
    match (t.start_time, t.end_time) {
        (Some(s), Some(e)) => format!("{}-{}", format_clock_time(s), format_clock_time(e)),
        (Some(s), None) => format_clock_time(s),
        _ => String::new(),
    }
}

fn task_row<'a>(label: String, t: &Task) -> Row<'a> {
    Row::new(vec![
        Cell::from(label),
        Cell::from(t.status.marker()),
        Cell::from(time_cell(t)),
        Cell::from(t.title.clone()),
    ])
    .style(task_style(t))
}

pub fn ui<B: StateBackend>(f: &mut Frame, app: &mut App<B>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    let tasks = app.store.tasks();
    let sel = app.selection;
    let locale = app.locale;

    let (header_text, first_col, rows): (String, &str, Vec<Row>) = match sel.mode {
        ViewMode::Day => {
            let stats = day_stats(tasks, sel.date);
            let header = format!("{}   {}/{} done", format_date_title(sel.date, locale), stats.done, stats.total);
            let rows = group_day(tasks, sel.date)
                .into_iter()
                .flat_map(|g| {
                    let section = g.section;
                    g.tasks.into_iter().enumerate().map(move |(i, t)| {
                        let label = if i == 0 { section.label(locale).to_string() } else { String::new() };
                        task_row(label, t)
                    })
                })
                .collect();
            (header, "Section", rows)
        }
        ViewMode::Week => {
            let start = sel.week_start();
            let stats = week_stats(tasks, start);
            let days = week_view(tasks, start);
            let per_day: Vec<String> = days
                .iter()
                .map(|d| format!("{} {}/{}", weekday_label(d.date, locale), d.stats.done, d.stats.total))
                .collect();
            let header = format!(
                "{}   done {} / pending {}\n{}",
                format_week_range(start, locale),
                stats.done,
                stats.pending(),
                per_day.join(" | ")
            );
            let rows = days
                .into_iter()
                .flat_map(|d| {
                    let date = d.date;
                    d.tasks.into_iter().enumerate().map(move |(i, t)| {
                        let label = if i == 0 {
                            format!("{} {}", weekday_label(date, locale), date.format("%m-%d"))
                        } else {
                            String::new()
                        };
                        task_row(label, t)
                    })
                })
                .collect();
            (header, "Day", rows)
        }
    };

    let view_name = match sel.mode {
        ViewMode::Day => "Day",
        ViewMode::Week => "Week",
    };
    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP).title(format!("mytodo - {}", view_name)));
    f.render_widget(header, chunks[0]);

    let widths = [
        Constraint::Length(12),
        Constraint::Length(4),
        Constraint::Length(12),
        Constraint::Min(20),
    ];

    let empty = rows.is_empty();
    let table = Table::new(rows, widths)
        .header(Row::new(vec![first_col, "", "Time", "Title"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    if empty {
        let placeholder = Paragraph::new("No tasks. Press 'a' to add one.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(placeholder, chunks[1]);
    } else {
        f.render_stateful_widget(table, chunks[1], &mut app.state);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match &app.message {
            Some(msg) => msg.clone(),
            None => "q: Quit | a: Add | e: Edit title | Space: Cycle status | d: Del | h/l: Day | [/]: Week | t: Today | v: Day/Week".to_string(),
        },
        InputMode::Adding | InputMode::EditingTitle => match &app.message {
            Some(msg) => format!("{} | Enter: Next | Esc: Cancel", msg),
            None => "Enter: Next | Esc: Cancel".to_string(),
        },
        InputMode::ConfirmDelete => "y: Delete | n/Esc: Keep".to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title".to_string(),
            1 => "Add Task: Enter Start Time (HH:mm, optional)".to_string(),
            _ => "Add Task: Enter End Time (HH:mm, optional)".to_string(),
        },
        InputMode::EditingTitle => "Edit Title".to_string(),
        InputMode::ConfirmDelete => {
            let name = app
                .target_id
                .as_deref()
                .and_then(|id| app.store.find(id))
                .map(|t| t.title.clone())
                .unwrap_or_default();
            format!("Delete '{}'? (y/n)", name)
        }
        InputMode::Normal => return,
    };

    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area);
    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
