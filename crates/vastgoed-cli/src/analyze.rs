//! Runs one analysis from the command line.

use vastgoed_analysis::{BatchScheduler, GeminiSummarizer, Session, SummarizerSettings};
use vastgoed_core::{AppConfig, Subject};
use vastgoed_providers::{ProviderClient, ProviderSettings};

/// Builds the provider client and summarizer from `config`, runs `subject`
/// and prints the resulting run as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if a client cannot be constructed or the run cannot be
/// serialized. Provider and summarizer failures are part of the printed run.
pub(crate) async fn run(config: &AppConfig, subject: Subject, summarize: bool) -> anyhow::Result<()> {
    let source = ProviderClient::new(ProviderSettings::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build provider client: {e}"))?;
    let summarizer = if summarize {
        Some(GeminiSummarizer::new(SummarizerSettings::from_app_config(config))?)
    } else {
        None
    };
    let scheduler = BatchScheduler::from_app_config(config);

    tracing::info!(
        postal_code = %subject.postal_code(),
        summarize,
        "running analysis"
    );

    let mut session = Session::default();
    let run = session
        .submit(&source, &scheduler, summarizer.as_ref(), subject)
        .await;

    for warning in run.warnings() {
        tracing::warn!(
            source = %warning.source,
            severity = ?warning.severity,
            "{}",
            warning.message
        );
    }

    println!("{}", serde_json::to_string_pretty(run)?);
    Ok(())
}
