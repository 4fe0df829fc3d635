//! Migrate command handler.

use std::path::PathBuf;

use color_eyre::Result;
use serde_json::json;

use crate::config::Config;
use crate::context::Context;
use crate::migration::LogDestination;
use crate::models::MigrationEvent;

use super::App;

impl App {
    /// Run the one-shot migration against the configured stores.
    pub async fn run_migrate(&self, output_dir: Option<PathBuf>, json: bool) -> Result<()> {
        let config = Config::load()?;
        let preferred_dir = output_dir.or_else(|| config.output.preferred_dir());

        let ctx = Context::connect(config)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?;
        let engine = ctx.engine(LogDestination::new(preferred_dir));

        let mut events = engine.subscribe();
        let progress = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    MigrationEvent::Progress {
                        record,
                        processed,
                        ok,
                        ko,
                        total,
                    } => {
                        tracing::info!(
                            "[{}/{}] {} ({} OK, {} KO)",
                            processed,
                            total,
                            record.title,
                            ok,
                            ko
                        );
                    }
                    MigrationEvent::Complete { .. } => break,
                }
            }
        });

        let result = engine.run().await;
        // The engine (and its senders) outlive the run; stop listening on error
        if result.is_err() {
            progress.abort();
        }
        let _ = progress.await;

        let summary = result.map_err(|e| color_eyre::eyre::eyre!("Migration failed: {}", e))?;
        let report = &summary.report;

        match &summary.log_file {
            Some(path) => tracing::info!("Migration log: {}", path.display()),
            None => tracing::warn!("Migration finished but its log could not be written"),
        }

        if json {
            let output = json!({
                "report": report,
                "log_file": summary.log_file,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            tracing::info!(
                "Migration complete: records {} OK / {} KO of {}, queue {} OK / {} KO of {}",
                report.records_ok,
                report.records_ko,
                report.records_total,
                report.queue_ok,
                report.queue_ko,
                report.queue_total
            );
        }

        Ok(())
    }
}
