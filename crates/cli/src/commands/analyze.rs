//! `pitwall analyze` — Column statistics for a telemetry CSV.

use clap::Args;
use pitwall_core::message::SessionKey;
use pitwall_session::{ModelSettings, SessionContext, SessionRegistry, analyst};
use pitwall_telemetry::{TelemetryDigest, TelemetrySummary, summarize};
use std::path::PathBuf;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// CSV file with a header row
    pub file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Ask the model for an analysis of the numbers
    #[arg(long)]
    pub explain: bool,

    /// Attach the analysis to this session (implies --explain)
    #[arg(short, long)]
    pub session: Option<String>,
}

pub async fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let csv = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read {}: {e}", args.file.display()))?;
    if csv.trim().is_empty() {
        return Err(format!("{} is empty", args.file.display()).into());
    }

    let summary = summarize(&csv);
    tracing::debug!(rows = summary.row_count, "Telemetry file summarized");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_table(&summary));
    }

    if !args.explain && args.session.is_none() {
        return Ok(());
    }

    let config = super::load_config()?;
    let provider = super::default_provider(&config)?;
    let settings = ModelSettings::from_config(&config);

    let analysis = analyst::analyze_telemetry(provider.as_ref(), &settings, &summary).await?;
    println!("\n{analysis}");

    if let Some(session) = args.session {
        let registry = SessionRegistry::new(
            pitwall_gateway::build_store(&config),
            config.session.clone(),
        );
        let digest =
            TelemetryDigest::from_summary(&summary, analysis, config.session.notable_columns);
        registry
            .actor(&SessionKey::new(session.clone()))
            .await
            .merge_context(SessionContext::with_telemetry(digest))
            .await?;
        println!("\nAttached to session {session}");
    }

    Ok(())
}

/// Plain-text table: one line per numeric column, in header order.
pub fn render_table(summary: &TelemetrySummary) -> String {
    let mut out = format!(
        "{} rows, {} columns ({} numeric)\n",
        summary.row_count,
        summary.headers.len(),
        summary.stats.len()
    );
    if summary.stats.is_empty() {
        return out;
    }

    let width = summary
        .stats
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    out.push_str(&format!(
        "{:<width$} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "column", "n", "min", "max", "mean", "std", "trend", "outliers"
    ));
    for (name, s) in summary.ordered_stats() {
        out.push_str(&format!(
            "{:<width$} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>+10.3} {:>8}\n",
            name, s.n, s.min, s.max, s.mean, s.std, s.trend, s.outlier_count
        ));
    }
    out
}
