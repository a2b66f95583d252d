//! Fixed-locale formatting helpers shared by every report.
//!
//! Dates print as `dd/mm/yyyy` and money as Brazilian reais (`R$ 1.234,56`),
//! regardless of the server's own locale.

use chrono::{DateTime, FixedOffset, Utc};

/// Placeholder printed for missing identity fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Slug used in file names when a user has no name.
const UNNAMED_SLUG: &str = "sem-nome";

/// Formats an instant as a calendar date (`dd/mm/yyyy`) in the given offset.
#[must_use]
pub fn format_date(instant: &DateTime<Utc>, offset: &FixedOffset) -> String {
    instant.with_timezone(offset).format("%d/%m/%Y").to_string()
}

/// Formats an instant as an ISO calendar date (`YYYY-MM-DD`, UTC) for file names.
#[must_use]
pub fn iso_date(instant: &DateTime<Utc>) -> String {
    instant.date_naive().format("%Y-%m-%d").to_string()
}

/// Formats an amount as `R$ 1.234,56`.
///
/// Negative amounts keep their sign after the currency symbol (`R$ -50,00`).
#[must_use]
pub fn format_currency(amount: f64) -> String {
    // Cast safety: monetary values stay far below 2^53 cents.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("R$ {sign}{grouped},{fraction:02}")
}

/// Returns the field value, or `N/A` when it is absent or empty.
#[must_use]
pub fn or_not_available(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

/// Turns a display name into a file-name slug: whitespace runs become `-`, letters
/// are lowercased, and anything other than letters, digits, `-`, `_` and `.` is
/// dropped so the slug is safe inside a `Content-Disposition` header.
#[must_use]
pub fn slugify(name: Option<&str>) -> String {
    let slug = name
        .unwrap_or_default()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if slug.is_empty() {
        UNNAMED_SLUG.to_string()
    } else {
        slug
    }
}
