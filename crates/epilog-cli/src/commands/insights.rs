//! Insights command for rendering aggregated reports.
//!
//! This module implements `epilog insights` with window options
//! (--monthly, --yearly) and output formats (human-readable, JSON).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use epilog_core::{Insights, Timeframe, compute_insights, period_bounds};
use epilog_db::Database;
use serde::Serialize;

// ========== Duration Formatting ==========

/// Formats seconds as an "Xm Ys" duration string.
///
/// The total is rounded to whole seconds before splitting, so values
/// just under a minute boundary roll over cleanly (119.6 -> "2m 0s").
/// Non-finite and negative inputs render as "0m 0s".
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    format!("{}m {}s", total / 60, total % 60)
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value / max;
    let filled = if ratio < 0.05 {
        1
    } else {
        // Clamp to 10 in case value > max
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Rendering ==========

/// Formats the period description for the report header.
fn format_period(timeframe: Timeframe, reference: DateTime<Utc>) -> String {
    let (start, _) = period_bounds(timeframe, reference);
    let start_date = start.date_naive();
    match timeframe {
        Timeframe::Weekly => format!("Week of {}", start_date.format("%b %-d, %Y")),
        Timeframe::Monthly => start_date.format("%B %Y").to_string(),
        Timeframe::Yearly => start_date.format("%Y").to_string(),
    }
}

/// Formats the human-readable insights report.
pub fn format_insights(insights: &Insights, reference: DateTime<Utc>) -> String {
    let mut output = String::new();

    writeln!(output, "SEIZURE INSIGHTS: {}", insights.timeframe).unwrap();
    writeln!(
        output,
        "Period: {}",
        format_period(insights.timeframe, reference)
    )
    .unwrap();
    writeln!(output).unwrap();

    if insights.total_count == 0 {
        writeln!(output, "No seizures recorded in this period.").unwrap();
        writeln!(output).unwrap();
    }

    writeln!(output, "Total seizures: {}", insights.total_count).unwrap();
    writeln!(
        output,
        "Avg. duration:  {}",
        format_duration_seconds(insights.average_duration_seconds)
    )
    .unwrap();
    writeln!(
        output,
        "{}:    {}",
        insights.busiest_caption(),
        insights.busiest_label()
    )
    .unwrap();

    // Frequency series, scaled against the busiest bucket
    writeln!(output).unwrap();
    writeln!(output, "FREQUENCY").unwrap();
    writeln!(output, "─────────").unwrap();
    let max_count = insights.frequency.iter().copied().max().unwrap_or(0);
    for (label, &count) in insights.bucket_labels.iter().zip(&insights.frequency) {
        let bar = progress_bar(f64::from(count), f64::from(max_count));
        writeln!(output, "{label:<4} {count:>3}  {bar}").unwrap();
    }

    // Normalized duration series is already scaled to [0, 100]
    writeln!(output).unwrap();
    writeln!(output, "AVG. DURATION").unwrap();
    writeln!(output, "─────────────").unwrap();
    for (label, &value) in insights
        .bucket_labels
        .iter()
        .zip(&insights.normalized_duration)
    {
        let bar = progress_bar(value, 100.0);
        writeln!(output, "{label:<4} {bar}").unwrap();
    }

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
struct JsonPeriod {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct JsonInsights<'a> {
    generated_at: String,
    period: JsonPeriod,
    #[serde(flatten)]
    insights: &'a Insights,
}

/// Formats insights as JSON with period metadata.
pub fn format_insights_json(
    insights: &Insights,
    reference: DateTime<Utc>,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let (start, end) = period_bounds(insights.timeframe, reference);

    // The end boundary is the first instant of the next period;
    // subtract a day for the inclusive last date.
    let last_date = end.date_naive() - Duration::days(1);

    let report = JsonInsights {
        generated_at: generated_at.to_rfc3339(),
        period: JsonPeriod {
            start: start.date_naive().format("%Y-%m-%d").to_string(),
            end: last_date.format("%Y-%m-%d").to_string(),
        },
        insights,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the insights command.
///
/// Fetches the full enclosing year of logs and lets the engine filter
/// down to the requested window.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    timeframe: Timeframe,
    date: Option<NaiveDate>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let reference = date.map_or(now, |d| {
        d.and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc()
    });

    let (year_start, year_end) = period_bounds(Timeframe::Yearly, reference);
    let logs = db.list_logs_in_range(year_start, year_end)?;
    tracing::debug!(fetched = logs.len(), %timeframe, "loaded logs for insights");

    let insights = compute_insights(&logs, timeframe, reference);

    if json {
        writeln!(writer, "{}", format_insights_json(&insights, reference, now)?)?;
    } else {
        write!(writer, "{}", format_insights(&insights, reference))?;
    }

    Ok(())
}
