//! Read-only views over a task collection: the day list split into
//! morning/afternoon/evening, the seven-day week grid, and their counters.
//!
//! Views are recomputed from scratch on every call and borrow from the
//! collection they were built from.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::date::{add_days, start_of_week, week_dates, Locale};
use crate::models::Task;

/// Orders optional start times with absent times after every real time.
pub fn compare_start_time(a: Option<NaiveTime>, b: Option<NaiveTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by start time; equal keys keep their collection order.
pub fn sort_by_start_time(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| compare_start_time(a.start_time, b.start_time));
}

/// Tasks dated `date`, sorted by start time.
pub fn day_tasks(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    let mut day: Vec<&Task> = tasks.iter().filter(|t| t.date == date).collect();
    sort_by_start_time(&mut day);
    day
}

/// Time-of-day bucket used by the day view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaySection {
    /// `[00:00, 12:00)`
    Morning,
    /// `[12:00, 18:00)`
    Afternoon,
    /// `[18:00, 24:00)` and untimed tasks.
    Evening,
}

impl DaySection {
    pub const ALL: [DaySection; 3] = [DaySection::Morning, DaySection::Afternoon, DaySection::Evening];

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (DaySection::Morning, Locale::En) => "Morning",
            (DaySection::Afternoon, Locale::En) => "Afternoon",
            (DaySection::Evening, Locale::En) => "Evening",
            (DaySection::Morning, Locale::Zh) => "上午",
            (DaySection::Afternoon, Locale::Zh) => "下午",
            (DaySection::Evening, Locale::Zh) => "晚间",
        }
    }
}

/// Picks the bucket for a task from the hour of its start time.
pub fn section_for(task: &Task) -> DaySection {
    match task.start_time.map(|t| t.hour()) {
        Some(h) if h < 12 => DaySection::Morning,
        Some(h) if h < 18 => DaySection::Afternoon,
        _ => DaySection::Evening,
    }
}

/// A non-empty bucket of the day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup<'a> {
    pub section: DaySection,
    pub tasks: Vec<&'a Task>,
}

/// The day view for `date`: its sorted tasks split into buckets, in
/// morning/afternoon/evening order. Empty buckets are left out.
pub fn group_day(tasks: &[Task], date: NaiveDate) -> Vec<DayGroup<'_>> {
    let day = day_tasks(tasks, date);
    DaySection::ALL
        .into_iter()
        .filter_map(|section| {
            let bucket: Vec<&Task> = day.iter().copied().filter(|t| section_for(t) == section).collect();
            if bucket.is_empty() {
                None
            } else {
                Some(DayGroup { section, tasks: bucket })
            }
        })
        .collect()
}

/// Completion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub done: usize,
}

impl Stats {
    pub fn pending(&self) -> usize {
        self.total - self.done
    }

    fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Stats::default(), |mut acc, t| {
            acc.total += 1;
            if t.is_done() {
                acc.done += 1;
            }
            acc
        })
    }
}

/// One row of the week view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDay<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
    pub stats: Stats,
}

/// Seven rows starting at `week_start`, each with that day's sorted tasks.
pub fn week_view(tasks: &[Task], week_start: NaiveDate) -> Vec<WeekDay<'_>> {
    week_dates(week_start)
        .into_iter()
        .map(|date| {
            let day = day_tasks(tasks, date);
            let stats = Stats::from_tasks(day.iter().copied());
            WeekDay { date, tasks: day, stats }
        })
        .collect()
}

/// Counters over every task dated within `week_start ..= week_start + 6`.
pub fn week_stats(tasks: &[Task], week_start: NaiveDate) -> Stats {
    let end = add_days(week_start, 6);
    Stats::from_tasks(tasks.iter().filter(|t| t.date >= week_start && t.date <= end))
}

/// Counters for a single day.
pub fn day_stats(tasks: &[Task], date: NaiveDate) -> Stats {
    Stats::from_tasks(tasks.iter().filter(|t| t.date == date))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Day,
    Week,
}

/// What the user is looking at: a selected date and a view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub date: NaiveDate,
    pub mode: ViewMode,
    pub monday_first: bool,
}

impl Selection {
    pub fn new(date: NaiveDate, monday_first: bool) -> Self {
        Self { date, mode: ViewMode::Day, monday_first }
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn shift_days(&mut self, days: i64) {
        self.date = add_days(self.date, days);
    }

    /// Moves the selected date by whole weeks.
    pub fn change_week(&mut self, offset_weeks: i64) {
        self.shift_days(offset_weeks.saturating_mul(7));
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Day => ViewMode::Week,
            ViewMode::Week => ViewMode::Day,
        };
    }

    pub fn week_start(&self) -> NaiveDate {
        start_of_week(self.date, self.monday_first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskDraft, TaskStatus};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(s: &str) -> Option<NaiveTime> {
        Some(NaiveTime::parse_from_str(s, "%H:%M").unwrap())
    }

    fn task(id: &str, date: NaiveDate, start: Option<NaiveTime>) -> Task {
        TaskDraft::new(format!("task {}", id), date)
            .with_times(start, None)
            .into_task(id.to_string())
            .unwrap()
    }

    #[test]
    fn absent_time_sorts_last() {
        assert_eq!(compare_start_time(hm("23:59"), None), Ordering::Less);
        assert_eq!(compare_start_time(None, hm("00:00")), Ordering::Greater);
        assert_eq!(compare_start_time(None, None), Ordering::Equal);
    }

    #[test]
    fn bucket_boundaries() {
        let d = ymd(2024, 6, 10);
        assert_eq!(section_for(&task("a", d, hm("11:59"))), DaySection::Morning);
        assert_eq!(section_for(&task("b", d, hm("12:00"))), DaySection::Afternoon);
        assert_eq!(section_for(&task("c", d, hm("17:59"))), DaySection::Afternoon);
        assert_eq!(section_for(&task("d", d, hm("18:00"))), DaySection::Evening);
        assert_eq!(section_for(&task("e", d, None)), DaySection::Evening);
    }

    #[test]
    fn week_stats_counts_inclusive_range() {
        let start = ymd(2024, 6, 10);
        let mut done = task("b", ymd(2024, 6, 16), None);
        done.status = TaskStatus::Done;
        let tasks = vec![
            task("a", start, None),
            done,
            task("c", ymd(2024, 6, 17), None),
            task("d", ymd(2024, 6, 9), None),
        ];
        let stats = week_stats(&tasks, start);
        assert_eq!(stats, Stats { total: 2, done: 1 });
        assert_eq!(stats.pending(), 1);
    }

    #[test]
    fn change_week_keeps_weekday() {
        let mut sel = Selection::new(ymd(2024, 6, 12), true);
        sel.change_week(-1);
        assert_eq!(sel.date, ymd(2024, 6, 5));
        assert_eq!(sel.week_start(), ymd(2024, 6, 3));
        sel.toggle_mode();
        assert_eq!(sel.mode, ViewMode::Week);
    }
}
