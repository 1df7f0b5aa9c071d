//! One-shot briefing prompts for fresh analysis results.
//!
//! These calls carry no session history. Their text is what ends up in a
//! digest's `analysis` or `commentary` field.

use crate::settings::ModelSettings;
use pitwall_core::error::Result;
use pitwall_core::message::Message;
use pitwall_core::provider::Provider;
use pitwall_strategy::{StrategyInput, StrategyResult};
use pitwall_telemetry::TelemetrySummary;
use tracing::debug;

const ANALYST_PROMPT: &str = "You are Pitwall's telemetry analyst. \
    Given per-column statistics of a lap telemetry export, point out trends, \
    outliers and anything a race engineer should check. \
    Answer in at most 6 short bullet points and admit uncertainty.";

const STRATEGIST_PROMPT: &str = "You are Pitwall's race strategist. \
    Given a simulated stint plan and its result, say whether the plan is sound, \
    what the main risk is, and one alternative worth simulating. \
    Answer in at most 5 short bullet points.";

/// Ask the model to read a telemetry summary.
pub async fn analyze_telemetry(
    provider: &dyn Provider,
    settings: &ModelSettings,
    summary: &TelemetrySummary,
) -> Result<String> {
    let stats = serde_json::to_string(&summary.stats)?;
    let user = format!(
        "Rows: {}\nColumns: {}\nStats per numeric column (n, min, max, mean, std, trend, outlierCount):\n{}",
        summary.row_count,
        summary.headers.join(", "),
        stats
    );

    debug!(rows = summary.row_count, columns = summary.stats.len(), "Requesting telemetry analysis");
    let response = provider
        .complete(settings.request(vec![
            Message::system(ANALYST_PROMPT),
            Message::user(user),
        ]))
        .await?;
    Ok(response.content)
}

/// Ask the model to comment on a simulated strategy.
pub async fn comment_strategy(
    provider: &dyn Provider,
    settings: &ModelSettings,
    input: &StrategyInput,
    result: &StrategyResult,
) -> Result<String> {
    let user = format!(
        "Request: {}\nResolved: {}\nResult: feasible={}, totalTime={}s, pits={}",
        serde_json::to_string(input)?,
        result.assumptions.describe(),
        result.feasible,
        result.total_time,
        result.pits
    );

    debug!(pits = result.pits, feasible = result.feasible, "Requesting strategy commentary");
    let response = provider
        .complete(settings.request(vec![
            Message::system(STRATEGIST_PROMPT),
            Message::user(user),
        ]))
        .await?;
    Ok(response.content)
}
