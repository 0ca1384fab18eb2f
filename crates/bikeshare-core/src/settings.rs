use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BikeshareError, Result};
use crate::models::{City, DaySelector, FilterSelection, MonthSelector};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore US bikeshare trip data by city, month and day of week
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bikeshare",
    about = "Explore US bikeshare trip data by city, month and day of week",
    version
)]
pub struct Settings {
    /// City to analyze (chicago, new york city, washington); prompts when omitted
    #[arg(long, value_parser = City::from_str)]
    pub city: Option<City>,

    /// Month filter (all, january .. june); prompts when omitted
    #[arg(long, value_parser = MonthSelector::from_str)]
    pub month: Option<MonthSelector>,

    /// Day-of-week filter (all, monday .. sunday); prompts when omitted
    #[arg(long, value_parser = DaySelector::from_str)]
    pub day: Option<DaySelector>,

    /// Directory containing chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Print how long each statistics section took
    #[arg(long)]
    pub timings: bool,

    /// Run once without prompts, pager or restart (requires --city)
    #[arg(long)]
    pub non_interactive: bool,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Forget remembered city, month and day answers
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Parse an explicit argument list and apply `--debug`.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args).resolved()
    }

    fn resolved(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Reject flag combinations clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.non_interactive && self.city.is_none() {
            return Err(BikeshareError::Config(
                "--non-interactive requires --city".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_interactive(&self) -> bool {
        !self.non_interactive
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }

    /// Selection fixed entirely by flags, if both filters were given.
    ///
    /// In non-interactive mode a missing filter means "all".
    pub fn preset_selection(&self) -> Option<FilterSelection> {
        match (self.month, self.day) {
            (Some(m), Some(d)) => Some(FilterSelection::new(m, d)),
            (m, d) if self.non_interactive => Some(FilterSelection::new(
                m.unwrap_or_default(),
                d.unwrap_or_default(),
            )),
            _ => None,
        }
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Answers remembered between runs in `~/.bikeshare/last_used.json`.
///
/// Only the selections are stored. Prompts offer them as the answer to an
/// empty input.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
}

impl LastUsedParams {
    /// `~/.bikeshare/last_used.json`, or relative to `.` without a home dir.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".bikeshare").join("last_used.json")
    }

    /// Read remembered answers.
    ///
    /// A missing file yields the default; an unreadable or corrupt one is
    /// logged and also yields the default.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("could not read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring corrupt {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Write answers via a temp file and rename, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!("saved last-used selections to {}", path.display());
        Ok(())
    }

    /// Delete the file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Record the selections of a completed run.
    pub fn remember(&mut self, city: City, selection: &FilterSelection) {
        self.city = Some(city.id().to_string());
        self.month = Some(selection.month.to_string().to_lowercase());
        self.day = Some(selection.day.to_string().to_lowercase());
    }

    pub fn last_city(&self) -> Option<City> {
        self.city.as_deref().and_then(|c| c.parse().ok())
    }

    pub fn last_month(&self) -> Option<MonthSelector> {
        self.month.as_deref().and_then(|m| m.parse().ok())
    }

    pub fn last_day(&self) -> Option<DaySelector> {
        self.day.as_deref().and_then(|d| d.parse().ok())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
