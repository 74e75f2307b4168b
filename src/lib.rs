//! # mytodo
//!
//! A day/week todo planner for the terminal. The library holds the core:
//! calendar arithmetic ([`date`]), the task model and its status cycle
//! ([`models`], [`status`]), the hydrating task store ([`store`]) over a
//! pluggable durable backend ([`storage`]), and the day/week views
//! ([`query`]). The `mytodo` binary adds a CLI ([`commands`]) and an
//! interactive TUI ([`tui`]) on top.
//!
//! ## Data storage
//!
//! Tasks are saved as one JSON array in your local data directory:
//! *   Linux: `~/.local/share/mytodo/mytodo.tasks.v1.json`
//! *   macOS: `~/Library/Application Support/mytodo/mytodo.tasks.v1.json`
//! *   Windows: `%LOCALAPPDATA%\mytodo\mytodo.tasks.v1.json`
//!
//! Set `MYTODO_DATA_DIR` to use another directory.

pub mod commands;
pub mod config;
pub mod date;
pub mod error;
pub mod models;
pub mod query;
pub mod seed;
pub mod status;
pub mod storage;
pub mod store;
pub mod tui;
