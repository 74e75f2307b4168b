use chrono::{NaiveDate, NaiveTime};

use crate::date::{add_days, start_of_week};
use crate::models::{Priority, Task, TaskStatus};

/// Which collection a fresh store starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedKind {
    /// A populated example week around today.
    #[default]
    Demo,
    Empty,
}

pub fn seed_tasks(kind: SeedKind, today: NaiveDate) -> Vec<Task> {
    match kind {
        SeedKind::Demo => demo_tasks(today),
        SeedKind::Empty => Vec::new(),
    }
}

fn hm(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn entry(n: u32, title: &str, date: NaiveDate, start: (u32, u32), end: (u32, u32), status: TaskStatus) -> Task {
    Task {
        id: format!("t-{}", n),
        title: title.to_string(),
        date,
        start_time: hm(start.0, start.1),
        end_time: hm(end.0, end.1),
        status,
        priority: None,
        tag: None,
    }
}

/// Example tasks: a busy today plus finished work on Monday to Friday of
/// the current week.
pub fn demo_tasks(today: NaiveDate) -> Vec<Task> {
    use TaskStatus::{Done, InProgress, Todo};

    let monday = start_of_week(today, true);
    let day = |offset: i64| add_days(monday, offset);

    let mut tasks = vec![
        entry(1, "Write weekly report", today, (9, 0), (10, 30), Done),
        entry(2, "Team standup: project sync", today, (10, 30), (11, 30), InProgress),
        entry(3, "Tidy up customer requirements", today, (11, 30), (12, 0), Todo),
        entry(4, "Product design review", today, (14, 0), (15, 30), Todo),
        entry(5, "Review and merge PRs", today, (16, 0), (17, 0), Todo),
        entry(6, "Read a technical article", today, (20, 0), (21, 0), Todo),
        entry(7, "Weekly report prep", day(0), (9, 0), (10, 0), Done),
        entry(8, "Project planning", day(0), (10, 0), (11, 30), Done),
        entry(9, "Code review", day(0), (14, 0), (15, 0), Done),
        entry(10, "Update docs", day(0), (16, 0), (17, 0), Done),
        entry(11, "Requirements analysis", day(1), (9, 0), (10, 30), Done),
        entry(12, "Interface design", day(1), (11, 0), (12, 0), Done),
        entry(13, "API development", day(1), (14, 0), (16, 0), Done),
        entry(14, "Database tuning", day(2), (9, 0), (11, 0), Done),
        entry(15, "Unit tests", day(2), (14, 0), (15, 30), Done),
        entry(16, "Deployment prep", day(2), (16, 0), (17, 0), Done),
        entry(17, "Customer meeting", day(3), (10, 0), (11, 0), Done),
        entry(18, "Prototype validation", day(3), (14, 0), (15, 30), Done),
        entry(19, "Friday retrospective", day(4), (9, 0), (10, 0), Done),
        entry(20, "Plan next week", day(4), (15, 0), (16, 0), Done),
    ];
    for t in tasks.iter_mut().filter(|t| t.id == "t-3" || t.id == "t-13") {
        t.priority = Some(Priority::High);
    }
    tasks
}
