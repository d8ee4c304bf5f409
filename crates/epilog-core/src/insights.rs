//! Insights aggregation engine.
//!
//! Buckets log records into a reporting window (weekly, monthly, or
//! yearly) and computes summary statistics plus two index-aligned time
//! series: seizure frequency per bucket and normalized average duration
//! per bucket.
//!
//! The engine is a pure function of its inputs. The reference instant
//! anchoring "now" is injected by the caller, so results are
//! reproducible independent of wall-clock time.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::log::{LogKind, LoggedEvent};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const WEEK_OF_MONTH_LABELS: [&str; 4] = ["W1", "W2", "W3", "W4"];
const MONTH_INITIALS: [&str; 12] = ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"];

/// Full weekday names, Sunday-indexed to match the busiest-day tally.
const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Reporting window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Monday-start week containing the reference instant; 7 buckets.
    Weekly,
    /// Calendar month containing the reference instant; 4 week buckets.
    Monthly,
    /// Calendar year containing the reference instant; 12 month buckets.
    Yearly,
}

impl Timeframe {
    /// Number of buckets in the frequency and duration series.
    #[must_use]
    pub const fn bucket_count(self) -> usize {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 4,
            Self::Yearly => 12,
        }
    }

    /// Bucket labels, index-aligned with the series.
    #[must_use]
    pub const fn bucket_labels(self) -> &'static [&'static str] {
        match self {
            Self::Weekly => &WEEKDAY_LABELS,
            Self::Monthly => &WEEK_OF_MONTH_LABELS,
            Self::Yearly => &MONTH_INITIALS,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        };
        write!(f, "{s}")
    }
}

/// Aggregated insights for one reporting window.
///
/// Derived data with no identity of its own: recomputed whenever the
/// records or timeframe change, and superseded wholesale by the next
/// computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    /// The window this report was computed for.
    pub timeframe: Timeframe,

    /// Count of seizure records in the period.
    pub total_count: usize,

    /// Mean seizure duration in seconds; 0.0 when no seizures.
    /// Missing durations count as zero. Formatting is left to callers.
    pub average_duration_seconds: f64,

    /// Full name of the busiest month (yearly) or weekday (otherwise).
    /// `None` when the period contains no seizures.
    pub busiest: Option<String>,

    /// Seizure count per bucket.
    pub frequency: Vec<u32>,

    /// Average seizure duration per bucket, scaled to [0, 100] against
    /// the maximum bucket average. All zeros when no bucket has a
    /// nonzero average.
    pub normalized_duration: Vec<f64>,

    /// Labels aligned index-for-index with the two series.
    pub bucket_labels: Vec<&'static str>,
}

impl Insights {
    /// Busiest bucket label with an "N/A" sentinel for empty periods.
    #[must_use]
    pub fn busiest_label(&self) -> &str {
        self.busiest.as_deref().unwrap_or("N/A")
    }

    /// Caption for the busiest stat ("Busiest month" or "Busiest day").
    #[must_use]
    pub const fn busiest_caption(&self) -> &'static str {
        match self.timeframe {
            Timeframe::Yearly => "Busiest month",
            Timeframe::Weekly | Timeframe::Monthly => "Busiest day",
        }
    }
}

/// Converts a date to midnight UTC.
fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// First day of the month after the given date's month.
fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
}

/// Calculates period boundaries for a timeframe as a half-open UTC
/// interval `[start, end)`.
///
/// Weekly periods start on Monday. The end boundary is the first
/// instant of the next period, so filtering with `t < end` is
/// equivalent to an inclusive filter against the period's last instant.
#[must_use]
pub fn period_bounds(timeframe: Timeframe, reference: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = reference.date_naive();
    match timeframe {
        Timeframe::Weekly => {
            let monday =
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            (midnight_utc(monday), midnight_utc(monday + Duration::days(7)))
        }
        Timeframe::Monthly => {
            let first = date.with_day(1).expect("day 1 is always valid");
            (midnight_utc(first), midnight_utc(first_of_next_month(first)))
        }
        Timeframe::Yearly => {
            let jan_1 =
                NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("Jan 1 is always valid");
            let next_jan_1 = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                .expect("Jan 1 is always valid");
            (midnight_utc(jan_1), midnight_utc(next_jan_1))
        }
    }
}

/// Series bucket index for a timestamp, or `None` when the timestamp
/// falls outside the bucket range.
///
/// Monthly months with more than 28 days produce a fifth partial week
/// whose records are dropped from the series (but still counted in the
/// totals and the busiest tally).
fn series_bucket(timeframe: Timeframe, at: DateTime<Utc>) -> Option<usize> {
    let index = match timeframe {
        Timeframe::Weekly => at.weekday().num_days_from_monday() as usize,
        Timeframe::Monthly => at.day0() as usize / 7,
        Timeframe::Yearly => at.month0() as usize,
    };
    (index < timeframe.bucket_count()).then_some(index)
}

/// Computes insights for the period containing `reference`.
///
/// Pure and deterministic: no I/O, no mutation of inputs, identical
/// inputs yield identical outputs. Records outside the period are
/// ignored; only [`LogKind::Seizure`] records contribute to the numeric
/// aggregates.
///
/// The busiest-day tally is Sunday-indexed while the weekly frequency
/// series is Monday-indexed. The two conventions are independent on
/// purpose: the series follows the Mon..Sun axis labels, the busiest
/// stat names a weekday outright.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn compute_insights<E: LoggedEvent>(
    records: &[E],
    timeframe: Timeframe,
    reference: DateTime<Utc>,
) -> Insights {
    let (start, end) = period_bounds(timeframe, reference);
    let bucket_count = timeframe.bucket_count();

    let mut frequency = vec![0_u32; bucket_count];
    let mut duration_sums = vec![0_f64; bucket_count];
    let mut duration_counts = vec![0_u32; bucket_count];

    let tally_len = match timeframe {
        Timeframe::Yearly => 12,
        Timeframe::Weekly | Timeframe::Monthly => 7,
    };
    let mut busiest_tally = vec![0_u32; tally_len];

    let mut total_count = 0_usize;
    let mut total_duration = 0_f64;
    let mut in_period = 0_usize;

    for record in records {
        let at = record.occurred_at();
        if at < start || at >= end {
            continue;
        }
        in_period += 1;
        if record.kind() != LogKind::Seizure {
            continue;
        }

        let duration = f64::from(record.duration_seconds().unwrap_or(0));
        total_count += 1;
        total_duration += duration;

        let tally_index = match timeframe {
            Timeframe::Yearly => at.month0() as usize,
            Timeframe::Weekly | Timeframe::Monthly => {
                at.weekday().num_days_from_sunday() as usize
            }
        };
        busiest_tally[tally_index] += 1;

        if let Some(index) = series_bucket(timeframe, at) {
            frequency[index] += 1;
            duration_sums[index] += duration;
            duration_counts[index] += 1;
        }
    }

    let average_duration_seconds = if total_count == 0 {
        0.0
    } else {
        total_duration / total_count as f64
    };

    // First index achieving the maximum tally wins ties.
    let busiest = if total_count == 0 {
        None
    } else {
        let mut best = 0;
        for (index, &tally) in busiest_tally.iter().enumerate() {
            if tally > busiest_tally[best] {
                best = index;
            }
        }
        let name = match timeframe {
            Timeframe::Yearly => MONTH_NAMES[best],
            Timeframe::Weekly | Timeframe::Monthly => DAY_NAMES[best],
        };
        Some(name.to_string())
    };

    let bucket_averages: Vec<f64> = duration_sums
        .iter()
        .zip(&duration_counts)
        .map(|(&sum, &count)| if count == 0 { 0.0 } else { sum / f64::from(count) })
        .collect();
    let max_average = bucket_averages.iter().fold(0.0_f64, |max, &v| max.max(v));
    let normalized_duration: Vec<f64> = if max_average > 0.0 {
        bucket_averages
            .iter()
            .map(|&v| v / max_average * 100.0)
            .collect()
    } else {
        vec![0.0; bucket_count]
    };

    tracing::debug!(
        %timeframe,
        in_period,
        total_count,
        "computed insights"
    );

    Insights {
        timeframe,
        total_count,
        average_duration_seconds,
        busiest,
        frequency,
        normalized_duration,
        bucket_labels: timeframe.bucket_labels().to_vec(),
    }
}
