//! Time and ratio arithmetic shared by every value object.

use chrono::{DateTime, SecondsFormat, Utc};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Whole days between `reference` and `created_at`, rounded up.
#[must_use]
pub fn age_in_days(reference: DateTime<Utc>, created_at: DateTime<Utc>) -> u64 {
    days_since(reference, created_at)
}

/// Whole days between `reference` and `timestamp`, rounded up. The direction of the
/// difference is ignored.
#[must_use]
pub fn days_since(reference: DateTime<Utc>, timestamp: DateTime<Utc>) -> u64 {
    (reference - timestamp).num_milliseconds().unsigned_abs().div_ceil(MILLIS_PER_DAY)
}

/// `numerator / denominator` rounded to two decimals, or `0` when the denominator is `0`.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "counts are far below 2^52")]
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }

    round_scaled(numerator as f64 / denominator as f64, 100.0)
}

/// `numerator / denominator` as a whole percentage, or `0` when the denominator is `0`.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "counts are far below 2^52")]
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }

    round_scaled(numerator as f64 / denominator as f64 * 100.0, 1.0)
}

/// Gini coefficient of a distribution of non-negative counts, rounded to two decimals.
///
/// `0` means perfectly even, values approaching `1` mean concentrated in few members.
/// Empty and all-zero distributions yield `0`.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "counts are far below 2^52")]
pub fn gini(values: &[u64]) -> f64 {
    let total: u64 = values.iter().sum();
    if values.is_empty() || total == 0 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(index, &value)| (index as f64 + 1.0) * value as f64)
        .sum();

    let coefficient = 2.0 * weighted / (n * total as f64) - (n + 1.0) / n;
    round_scaled(coefficient.max(0.0), 100.0)
}

fn round_scaled(value: f64, scale: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    (value * scale).round() / scale
}

/// Render a timestamp in the single canonical text format (`2024-01-01T00:00:00Z`).
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
