use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DashboardError;
use crate::models::{DuplicatePolicy, PersistFailurePolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Township plot dashboard over a spreadsheet-backed table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "township-dashboard",
    about = "Township plot dashboard over a spreadsheet-backed table",
    version
)]
pub struct Settings {
    /// CSV file path or http(s) URL of the plot sheet
    #[arg(long)]
    pub source: Option<String>,

    /// Google Sheets spreadsheet id (read through the CSV export)
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Worksheet gid for --sheet-id
    #[arg(long, default_value = "0")]
    pub gid: u64,

    /// Allow writing back to an http(s) source with PUT
    #[arg(long)]
    pub writable: bool,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "update"])]
    pub view: String,

    /// Township to select (first township when omitted)
    #[arg(long)]
    pub township: Option<String>,

    /// Ownership values to include (all when omitted)
    #[arg(long)]
    pub ownership: Vec<String>,

    /// Status values to include (all when omitted)
    #[arg(long)]
    pub status: Vec<String>,

    /// Registry status values to include (all when omitted)
    #[arg(long)]
    pub registry_status: Vec<String>,

    /// Plot number to edit (update view)
    #[arg(long)]
    pub plot: Option<String>,

    /// Field to edit (update view)
    #[arg(long)]
    pub field: Option<String>,

    /// New value for --field (update view)
    #[arg(long)]
    pub value: Option<String>,

    /// How an edit treats several plots sharing one plot number
    #[arg(long, default_value = "all-matches", value_parser = ["first-match", "all-matches", "error-on-multiple"])]
    pub duplicate_policy: String,

    /// What to do with a local edit when writing the sheet fails
    #[arg(long, default_value = "reload", value_parser = ["reload", "retain"])]
    pub on_persist_failure: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── SourceLocation ─────────────────────────────────────────────────────────────

/// Where the plot table lives, resolved from `--source` / `--sheet-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
    GoogleSheet { spreadsheet_id: String, gid: u64 },
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.township-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub township: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_policy: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".township-dashboard").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation: accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear saved configuration");
            }
            return Self::resolve_flags(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let saved_township = last.township.clone();

        // A source given on the command line replaces the whole saved
        // location, so --source never mixes with a saved --sheet-id.
        if !is_arg_explicitly_set(&matches, "source")
            && !is_arg_explicitly_set(&matches, "sheet_id")
        {
            settings.source = last.source;
            settings.sheet_id = last.sheet_id;
            if !is_arg_explicitly_set(&matches, "gid") {
                if let Some(v) = last.gid {
                    settings.gid = v;
                }
            }
        }
        // Headless views act on a township only when it is named explicitly:
        // `summary` then covers every township and `update` refuses to run.
        if settings.view == "dashboard"
            && !is_arg_explicitly_set(&matches, "township")
            && settings.township.is_none()
        {
            settings.township = saved_township.clone();
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "duplicate_policy") {
            if let Some(v) = last.duplicate_policy {
                if v.parse::<DuplicatePolicy>().is_ok() {
                    settings.duplicate_policy = v;
                }
            }
        }

        settings = Self::resolve_flags(settings);

        let mut params = LastUsedParams::from(&settings);
        if params.township.is_none() {
            params.township = saved_township;
        }
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used settings");
        }

        settings
    }

    /// Apply the `--debug` flag.
    fn resolve_flags(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Resolve the table location. `--source` wins over `--sheet-id`.
    pub fn source_location(&self) -> Result<SourceLocation, DashboardError> {
        if let Some(source) = self.source.as_deref() {
            let trimmed = source.trim();
            if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                return Ok(SourceLocation::Url(trimmed.to_string()));
            }
            return Ok(SourceLocation::File(PathBuf::from(trimmed)));
        }
        if let Some(id) = self.sheet_id.as_deref() {
            return Ok(SourceLocation::GoogleSheet {
                spreadsheet_id: id.trim().to_string(),
                gid: self.gid,
            });
        }
        Err(DashboardError::Config(
            "no data source: pass --source <file|url> or --sheet-id <id>".to_string(),
        ))
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy.parse().unwrap_or_default()
    }

    pub fn persist_failure_policy(&self) -> PersistFailurePolicy {
        self.on_persist_failure.parse().unwrap_or_default()
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source: s.source.clone(),
            sheet_id: s.sheet_id.clone(),
            gid: Some(s.gid),
            township: s.township.clone(),
            theme: Some(s.theme.clone()),
            duplicate_policy: Some(s.duplicate_policy.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
