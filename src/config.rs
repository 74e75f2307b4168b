use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::date::Locale;
use crate::seed::SeedKind;

pub const DATA_DIR_VAR: &str = "MYTODO_DATA_DIR";
pub const WEEK_START_VAR: &str = "MYTODO_WEEK_START";
pub const LOCALE_VAR: &str = "MYTODO_LOCALE";
pub const SEED_VAR: &str = "MYTODO_SEED";
pub const LOG_VAR: &str = "MYTODO_LOG";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the persisted task file.
    pub data_dir: PathBuf,
    pub monday_first: bool,
    pub locale: Locale,
    pub seed: SeedKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            monday_first: true,
            locale: Locale::En,
            seed: SeedKind::Demo,
        }
    }
}

/// `~/.local/share/mytodo` on Linux, or `./mytodo` if there is no data dir.
fn default_data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("mytodo");
    p
}

impl Config {
    /// Builds the configuration from `MYTODO_*` variables.
    ///
    /// Unrecognised values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(WEEK_START_VAR) {
            match parse_week_start(&raw) {
                Some(monday_first) => config.monday_first = monday_first,
                None => warn!(var = WEEK_START_VAR, value = %raw, "ignoring unknown week start"),
            }
        }
        if let Some(raw) = lookup(LOCALE_VAR) {
            match raw.parse() {
                Ok(locale) => config.locale = locale,
                Err(e) => warn!(var = LOCALE_VAR, error = %e, "ignoring locale"),
            }
        }
        if let Some(raw) = lookup(SEED_VAR) {
            match raw.trim().to_lowercase().as_str() {
                "demo" => config.seed = SeedKind::Demo,
                "empty" | "none" => config.seed = SeedKind::Empty,
                _ => warn!(var = SEED_VAR, value = %raw, "ignoring unknown seed kind"),
            }
        }
        config
    }
}

/// `monday` -> `Some(true)`, `sunday` -> `Some(false)`.
pub fn parse_week_start(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(true),
        "sunday" | "sun" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config_from(&[]);
        assert!(config.monday_first);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.seed, SeedKind::Demo);
        assert!(config.data_dir.ends_with("mytodo"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (DATA_DIR_VAR, "/tmp/todo"),
            (WEEK_START_VAR, "Sunday"),
            (LOCALE_VAR, "zh"),
            (SEED_VAR, "empty"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/todo"));
        assert!(!config.monday_first);
        assert_eq!(config.locale, Locale::Zh);
        assert_eq!(config.seed, SeedKind::Empty);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_from(&[(WEEK_START_VAR, "friday"), (LOCALE_VAR, "fr")]);
        assert!(config.monday_first);
        assert_eq!(config.locale, Locale::En);
    }
}
