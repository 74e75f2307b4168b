use std::io::{self, StdinLock};
use std::process;

use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use mytodo::commands::*;
use mytodo::config::{parse_week_start, Config, LOG_VAR};
use mytodo::date::Locale;
use mytodo::error::TaskError;
use mytodo::models::Task;
use mytodo::query::Selection;
use mytodo::seed::seed_tasks;
use mytodo::storage::{FileBackend, MemoryBackend, StateBackend};
use mytodo::store::TaskStore;
use mytodo::tui::{app::App, run_tui};

#[derive(Parser)]
#[command(name = "mytodo")]
#[command(about = "Day and week todo planner for the terminal", long_about = None)]
struct Cli {
    /// Label language (en, zh)
    #[arg(long, global = true)]
    locale: Option<Locale>,
    /// First day of the week (monday, sunday)
    #[arg(long, global = true, value_parser = week_start_arg)]
    week_start: Option<bool>,
    /// Keep tasks in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

fn week_start_arg(raw: &str) -> Result<bool, String> {
    parse_week_start(raw).ok_or_else(|| format!("expected monday or sunday, got '{}'", raw))
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Day of the task: YYYY-MM-DD, today, tomorrow or yesterday
        #[arg(short, long)]
        date: Option<String>,
        /// Start time, HH:mm
        #[arg(short, long)]
        start: Option<String>,
        /// End time, HH:mm
        #[arg(short, long)]
        end: Option<String>,
        /// Priority (normal, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Category tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show one day grouped into morning, afternoon and evening
    Day {
        /// Day to show (defaults to today)
        date: Option<String>,
    },
    /// Show the week containing a date
    Week {
        /// Any day of the week to show (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Move by this many weeks, e.g. -1 for last week
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
    /// Advance a task: todo -> in_progress -> done -> todo
    Cycle {
        id: String,
    },
    /// Edit a task ("none" clears an optional field)
    Edit {
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// New start time
        #[arg(short, long)]
        start: Option<String>,
        /// New end time
        #[arg(short, long)]
        end: Option<String>,
        /// Set the status directly
        #[arg(long)]
        status: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Remove a task
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Forget all saved tasks
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Some(Commands::Ui) | None);
    // Log lines would be drawn over the alternate screen.
    if !interactive {
        init_logging();
    }

    let mut config = Config::from_env();
    if let Some(locale) = cli.locale { config.locale = locale; }
    if let Some(monday_first) = cli.week_start { config.monday_first = monday_first; }

    let today = Local::now().date_naive();
    let seed = seed_tasks(config.seed, today);
    let code = if cli.ephemeral {
        run(cli.command, MemoryBackend::new(), seed, &config)
    } else {
        run(cli.command, FileBackend::new(&config.data_dir), seed, &config)
    };
    process::exit(code);
}

fn report<T>(result: Result<T, TaskError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn stdin() -> StdinLock<'static> {
    io::stdin().lock()
}

fn run<B: StateBackend>(command: Option<Commands>, backend: B, seed: Vec<Task>, config: &Config) -> i32 {
    let today = Local::now().date_naive();
    let locale = config.locale;

    // Viewing and completions never touch the data file.
    match command {
        Some(Commands::Day { date }) => {
            return report(
                date.as_deref()
                    .map_or(Ok(today), |d| resolve_date(d, today))
                    .map(|date| cmd_day(&TaskStore::new(backend, seed).load(), date, locale)),
            );
        }
        Some(Commands::Week { date, offset }) => {
            return report(
                date.as_deref()
                    .map_or(Ok(today), |d| resolve_date(d, today))
                    .map(|date| {
                        let mut selection = Selection::new(date, config.monday_first);
                        selection.change_week(offset);
                        cmd_week(&TaskStore::new(backend, seed).load(), selection.week_start(), locale)
                    }),
            );
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return 1;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "mytodo", &mut io::stdout());
            return 0;
        }
        _ => {}
    }

    let mut store = TaskStore::open(backend, seed);
    match command {
        Some(Commands::Add { title, date, start, end, priority, tag }) => {
            let input = NewTaskInput { title, date, start, end, priority, tag };
            report(input.into_draft(today).and_then(|draft| cmd_add(&mut store, draft, false)))
        }
        Some(Commands::Cycle { id }) => report(cmd_cycle(&mut store, &id, false)),
        Some(Commands::Edit { id, title, date, start, end, status, priority, tag }) => {
            let input = EditInput { title, date, start, end, status, priority, tag };
            report(input.into_patch(today).and_then(|patch| cmd_edit(&mut store, &id, &patch, false)))
        }
        Some(Commands::Remove { id, force }) => report(cmd_remove(&mut store, &id, force, &mut stdin(), false)),
        Some(Commands::Reset { force }) => match cmd_reset(&mut store, force, &mut stdin(), false) {
            Ok(_) => 0,
            Err(e) => {
                eprintln!("Failed to reset tasks: {}", e);
                1
            }
        },
        Some(Commands::Day { .. } | Commands::Week { .. } | Commands::Completions { .. }) => 0,
        Some(Commands::Ui) | None => {
            let mut app = App::new(store, today, config.monday_first, locale);
            if let Err(e) = run_tui(&mut app) {
                eprintln!("Error running TUI: {}", e);
                return 1;
            }
            0
        }
    }
}
