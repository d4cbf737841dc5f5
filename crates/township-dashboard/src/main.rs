mod bootstrap;
mod report;

use anyhow::{Context, Result};
use township_core::settings::Settings;
use township_data::filter::Facet;
use township_data::mutator::EditRequest;
use township_runtime::store::Store;
use township_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    // The full-screen dashboard owns the terminal, so it always logs to a file.
    let log_file = match (settings.view.as_str(), settings.log_file.clone()) {
        (_, Some(path)) => Some(path),
        ("dashboard", None) => Some(bootstrap::default_log_file()),
        _ => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Township Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Duplicates: {}, On persist failure: {}",
        settings.view,
        settings.theme,
        settings.duplicate_policy,
        settings.on_persist_failure
    );

    let location = settings.source_location()?;
    let source = bootstrap::build_source(&location, settings.writable)?;
    let source_name = source.describe();

    let store = tokio::select! {
        result = Store::open(
            source,
            settings.duplicate_policy(),
            settings.persist_failure_policy(),
        ) => result.with_context(|| format!("opening {}", source_name))?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received while loading; exiting");
            return Ok(());
        }
    };

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting dashboard over {}", source_name);
            let app = App::new(&settings.theme, store, settings.township.as_deref());

            // The loop exits on 'q' / Ctrl+C inside the TUI; the OS-level
            // handler covers signals that arrive outside raw mode.
            tokio::select! {
                result = app.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        "summary" => {
            let restrictions: report::Restrictions<'_> = [
                (Facet::Ownership, settings.ownership.as_slice()),
                (Facet::Status, settings.status.as_slice()),
                (Facet::RegistryStatus, settings.registry_status.as_slice()),
            ];
            let entries =
                report::summaries(store.table(), settings.township.as_deref(), &restrictions)?;
            if entries.is_empty() {
                println!("No townships found in {}", source_name);
            }
            let blocks: Vec<String> = entries.iter().map(report::format_summary).collect();
            println!("{}", blocks.join("\n\n"));
        }

        "update" => {
            let township = settings
                .township
                .as_deref()
                .context("--township is required for the update view")?;
            let plot = settings
                .plot
                .as_deref()
                .context("--plot is required for the update view")?;
            let field = settings
                .field
                .as_deref()
                .context("--field is required for the update view")?;
            let value = settings
                .value
                .as_deref()
                .context("--value is required for the update view")?;

            let request = EditRequest::parse(township, plot, field, value)?;
            let mut store = store;
            let report = store.apply_edit(&request).await?;
            println!(
                "{}",
                report::format_update(plot, request.field.column(), &report)
            );
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
