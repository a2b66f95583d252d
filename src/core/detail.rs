//! Detail view assembly for a selected user.
//!
//! Turns a [`UserRecord`] into display-ready data: identity, onboarding status, the
//! two chart datasets and the latest transactions. Drawing the charts is left to
//! the client.

use crate::{
    core::{
        directory::UserRecord,
        format::{self, format_currency, format_date},
    },
    entities::{financial_data, transaction},
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Number of transactions shown in the detail view.
pub const DETAIL_TRANSACTION_LIMIT: usize = 5;

const SUMMARY_LABELS: [&str; 3] = ["Renda", "Gastos", "Total Livre"];
const SUMMARY_COLORS: [&str; 3] = [
    "rgba(34, 197, 94, 0.8)",
    "rgba(239, 68, 68, 0.8)",
    "rgba(59, 130, 246, 0.8)",
];
const DEBT_LABELS: [&str; 3] = ["Cartão de Crédito", "Empréstimos", "Cheque Especial"];
const DEBT_COLORS: [&str; 3] = [
    "rgba(239, 68, 68, 0.8)",
    "rgba(245, 158, 11, 0.8)",
    "rgba(168, 85, 247, 0.8)",
];

/// One chart's labels, values and colors, index-aligned
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    /// Category labels
    pub labels: Vec<String>,
    /// Values per label
    pub values: Vec<f64>,
    /// CSS colors per label
    pub colors: Vec<String>,
}

impl ChartDataset {
    fn new(labels: [&str; 3], values: [f64; 3], colors: [&str; 3]) -> Self {
        Self {
            labels: labels.iter().map(ToString::to_string).collect(),
            values: values.to_vec(),
            colors: colors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The two charts of the detail view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserCharts {
    /// Income, expenses and free total (floored at zero)
    pub summary: ChartDataset,
    /// The three debt categories
    pub debts: ChartDataset,
}

/// Onboarding status badge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataStatus {
    /// Financial snapshot present
    #[serde(rename = "Completo")]
    Complete,
    /// No snapshot yet
    #[serde(rename = "Pendente")]
    Pending,
}

/// A transaction formatted for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLine {
    /// `dd/mm/yyyy`
    pub date: String,
    /// Free-text description
    pub description: String,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: transaction::TransactionType,
    /// Signed, currency-formatted amount such as `+R$ 50,00`
    pub amount: String,
}

/// Everything the detail dialog shows for one user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    /// User id
    pub id: i64,
    /// Name or `N/A`
    pub name: String,
    /// E-mail or `N/A`
    pub email: String,
    /// Phone or `N/A`
    pub phone: String,
    /// Registration date
    pub registered_on: String,
    /// Last access date
    pub last_access_on: String,
    /// Onboarding status
    pub status: DataStatus,
    /// Raw snapshot, when present
    pub financial_data: Option<financial_data::Model>,
    /// Chart datasets, when a snapshot is present
    pub charts: Option<UserCharts>,
    /// Latest transactions
    pub recent_transactions: Vec<TransactionLine>,
}

/// Builds the chart datasets for a user, or `None` when there is no snapshot.
#[must_use]
pub fn user_charts(user: &UserRecord) -> Option<UserCharts> {
    let data = user.financial_data.as_ref()?;
    Some(UserCharts {
        summary: ChartDataset::new(
            SUMMARY_LABELS,
            [
                data.monthly_income,
                data.monthly_expenses,
                data.free_total().max(0.0),
            ],
            SUMMARY_COLORS,
        ),
        debts: ChartDataset::new(
            DEBT_LABELS,
            [data.credit_card_debt, data.loan_debt, data.overdraft_debt],
            DEBT_COLORS,
        ),
    })
}

/// Formats a transaction for display, deriving the sign from its type.
#[must_use]
pub fn transaction_line(tx: &transaction::Model, offset: &FixedOffset) -> TransactionLine {
    TransactionLine {
        date: format_date(&tx.date, offset),
        description: tx.description.clone(),
        kind: tx.kind,
        amount: format!("{}{}", tx.kind.sign(), format_currency(tx.amount.abs())),
    }
}

/// Assembles the detail view for a user.
#[must_use]
pub fn user_detail(user: &UserRecord, offset: &FixedOffset) -> UserDetail {
    UserDetail {
        id: user.id,
        name: format::or_not_available(user.name.as_deref()).to_string(),
        email: format::or_not_available(user.email.as_deref()).to_string(),
        phone: format::or_not_available(user.phone.as_deref()).to_string(),
        registered_on: format_date(&user.created_at, offset),
        last_access_on: format_date(&user.last_access_at, offset),
        status: if user.has_financial_data() {
            DataStatus::Complete
        } else {
            DataStatus::Pending
        },
        financial_data: user.financial_data.clone(),
        charts: user_charts(user),
        recent_transactions: user
            .transactions
            .iter()
            .take(DETAIL_TRANSACTION_LIMIT)
            .map(|tx| transaction_line(tx, offset))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::TransactionType;
    use crate::test_utils::*;
    use chrono::{TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_chart_values_for_example_user() {
        let user = sample_record(
            Some("Ana"),
            Some(sample_financial_data(5000.0, 3000.0, 500.0, 0.0, 0.0)),
        );

        let charts = user_charts(&user).unwrap();

        assert_eq!(charts.summary.values, vec![5000.0, 3000.0, 2000.0]);
        assert_eq!(charts.debts.values, vec![500.0, 0.0, 0.0]);
        assert_eq!(charts.summary.labels, vec!["Renda", "Gastos", "Total Livre"]);
        assert_eq!(charts.debts.colors.len(), 3);
    }

    #[test]
    fn test_free_total_is_floored_for_charts() {
        let user = sample_record(
            Some("Bia"),
            Some(sample_financial_data(2000.0, 2500.0, 0.0, 0.0, 0.0)),
        );
        let charts = user_charts(&user).unwrap();
        assert_eq!(charts.summary.values[2], 0.0);
    }

    #[test]
    fn test_no_charts_without_snapshot() {
        let user = sample_record(Some("Caio"), None);
        assert!(user_charts(&user).is_none());

        let detail = user_detail(&user, &utc());
        assert_eq!(detail.status, DataStatus::Pending);
        assert!(detail.charts.is_none());
    }

    #[test]
    fn test_detail_shows_five_signed_transactions() {
        let snapshot = sample_financial_data(1.0, 1.0, 0.0, 0.0, 0.0);
        let mut user = sample_record(None, Some(snapshot));
        let date = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        user.transactions = (0..8)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                sample_transaction(kind, &format!("Item {i}"), 1250.5, date)
            })
            .collect();

        let detail = user_detail(&user, &utc());

        assert_eq!(detail.name, "N/A");
        assert_eq!(detail.status, DataStatus::Complete);
        assert_eq!(detail.recent_transactions.len(), DETAIL_TRANSACTION_LIMIT);
        assert_eq!(detail.recent_transactions[0].amount, "+R$ 1.250,50");
        assert_eq!(detail.recent_transactions[1].amount, "-R$ 1.250,50");
        assert_eq!(detail.recent_transactions[0].date, "10/05/2024");
    }

    #[test]
    fn test_status_serializes_in_portuguese() {
        let json = serde_json::to_string(&DataStatus::Pending).unwrap();
        assert_eq!(json, "\"Pendente\"");
    }
}
