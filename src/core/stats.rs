//! Summary counters shown above the directory table.
//!
//! Always computed over the full, unfiltered list.

use crate::core::directory::UserRecord;
use serde::{Deserialize, Serialize};

/// Aggregate figures for the whole directory
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    /// Number of users listed
    pub total_users: usize,
    /// Number of users with a financial snapshot
    pub users_with_data: usize,
    /// Mean monthly income over users with a snapshot, or 0 when there are none
    pub avg_income: f64,
    /// Sum of all debts over users with a snapshot
    pub total_debts: f64,
}

/// Computes the summary counters for a list of users.
#[must_use]
pub fn compute_stats(users: &[UserRecord]) -> DirectoryStats {
    let snapshots: Vec<_> = users
        .iter()
        .filter_map(|u| u.financial_data.as_ref())
        .collect();

    let users_with_data = snapshots.len();
    let total_income: f64 = snapshots.iter().map(|f| f.monthly_income).sum();
    let total_debts: f64 = snapshots.iter().map(|f| f.total_debts()).sum();

    // Cast safety: user counts are tiny compared to f64 precision
    #[allow(clippy::cast_precision_loss)]
    let avg_income = if users_with_data > 0 {
        total_income / users_with_data as f64
    } else {
        0.0
    };

    DirectoryStats {
        total_users: users.len(),
        users_with_data,
        avg_income,
        total_debts,
    }
}
