use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use township_core::settings::SourceLocation;
use township_data::file_source::CsvFileSource;
use township_data::http_source::HttpCsvSource;
use township_data::source::TableSource;

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.township-dashboard/`, or `./.township-dashboard/` without a home.
pub fn dashboard_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".township-dashboard")
}

/// Ensure `~/.township-dashboard/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = dashboard_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Log file used by the full-screen dashboard when `--log-file` is absent.
pub fn default_log_file() -> PathBuf {
    dashboard_dir().join("logs").join("dashboard.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names onto `tracing` filter directives.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, events are appended to that file without ANSI
/// colours; otherwise they go to stderr. The full-screen dashboard always
/// passes a file so log lines never land on the alternate screen.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = log_file.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Source bootstrap ───────────────────────────────────────────────────────────

/// Build the [`TableSource`] for a resolved location. `writable` only
/// matters for plain http(s) URLs; Google Sheet exports are read-only.
pub fn build_source(
    location: &SourceLocation,
    writable: bool,
) -> township_core::Result<Box<dyn TableSource>> {
    Ok(match location {
        SourceLocation::File(path) => Box::new(CsvFileSource::new(path.clone())),
        SourceLocation::Url(url) => Box::new(HttpCsvSource::new(url.clone(), writable)?),
        SourceLocation::GoogleSheet {
            spreadsheet_id,
            gid,
        } => Box::new(HttpCsvSource::google_sheet(spreadsheet_id, &gid.to_string())?),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();
        let log_file = default_log_file();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let dir = tmp.path().join(".township-dashboard");
        assert!(dir.is_dir(), ".township-dashboard dir must exist");
        assert!(dir.join("logs").is_dir(), "logs subdir must exist");
        assert_eq!(log_file, dir.join("logs").join("dashboard.log"));
    }

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("CRITICAL"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("Trace"), "trace");
    }

    #[test]
    fn test_build_source_file() {
        let source = build_source(&SourceLocation::File(PathBuf::from("plots.csv")), false)
            .expect("file source");
        assert_eq!(source.describe(), "plots.csv");
        // Local files are always writable.
        assert!(source.is_writable());
    }

    #[test]
    fn test_build_source_url_respects_writable_flag() {
        let url = SourceLocation::Url("https://example.com/plots.csv".to_string());
        assert!(!build_source(&url, false).expect("url source").is_writable());
        assert!(build_source(&url, true).expect("url source").is_writable());
    }

    #[test]
    fn test_build_source_google_sheet_is_read_only() {
        let location = SourceLocation::GoogleSheet {
            spreadsheet_id: "abc123".to_string(),
            gid: 7,
        };
        let source = build_source(&location, true).expect("sheet source");
        assert!(!source.is_writable());
        assert!(source.describe().contains("abc123"));
        assert!(source.describe().contains("gid 7"));
    }
}
