//! Directory filtering.
//!
//! Derives the visible subset of the directory from a free-text query and a
//! registration date range. Both predicates must hold. Filtering is a plain O(n)
//! pass over the in-memory list and is simply re-run whenever an input changes.

use crate::{
    core::directory::UserRecord,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Months, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Registration date window selected in the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// No date restriction
    #[default]
    All,
    /// Registered since local midnight
    Today,
    /// Registered within the last 7 days
    Week,
    /// Registered within the last calendar month
    Month,
}

impl DateRange {
    /// Earliest registration instant accepted by this range, relative to `now`.
    ///
    /// `now` carries the time zone that defines "today". Returns `None` for
    /// [`DateRange::All`].
    #[must_use]
    pub fn cutoff<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let cutoff = match self {
            Self::All => return None,
            Self::Today => now
                .with_time(NaiveTime::MIN)
                .earliest()
                .unwrap_or_else(|| now.clone()),
            Self::Week => now.clone() - Duration::days(7),
            Self::Month => now
                .clone()
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now.clone()),
        };
        Some(cutoff.with_timezone(&Utc))
    }

    /// Value used in query strings (`all`, `today`, `week`, `month`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(Error::InvalidFilter {
                message: format!("unknown date range '{other}'"),
            }),
        }
    }
}

/// Whether the query is a case-insensitive substring of the user's name, e-mail or
/// phone. An empty query matches everyone; a missing field never matches.
#[must_use]
pub fn matches_query(user: &UserRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    [&user.name, &user.email, &user.phone]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Returns the users matching both the text query and the date range, in their
/// original order.
#[must_use]
pub fn filter_users<'a, Tz: TimeZone>(
    users: &'a [UserRecord],
    query: &str,
    range: DateRange,
    now: &DateTime<Tz>,
) -> Vec<&'a UserRecord> {
    let cutoff = range.cutoff(now);
    users
        .iter()
        .filter(|user| matches_query(user, query))
        .filter(|user| cutoff.is_none_or(|cutoff| user.created_at >= cutoff))
        .collect()
}
