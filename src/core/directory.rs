//! User directory business logic.
//!
//! Loads every `USER`-role account together with its financial snapshot, its most
//! recent transactions and its challenge progress, and assembles them into
//! [`UserRecord`] values. This is the data behind `GET /api/admin/users`; the module
//! only reads.

use crate::{
    entities::{
        ChallengeProgress, FinancialData, Role, Transaction, User, challenge_progress,
        financial_data, transaction, user,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Maximum number of transactions attached to each record, newest first.
pub const RECENT_TRANSACTION_LIMIT: u64 = 10;

/// A user together with all nested data the dashboard needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User id
    pub id: i64,
    /// Display name
    pub name: Option<String>,
    /// E-mail
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Always `USER` for directory entries
    pub role: user::Role,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_access_at: DateTime<Utc>,
    /// Current financial snapshot; `None` means onboarding is pending
    pub financial_data: Option<financial_data::Model>,
    /// Most recent transactions, newest first
    #[serde(default)]
    pub transactions: Vec<transaction::Model>,
    /// Savings challenge progress rows
    #[serde(default)]
    pub challenge_progress: Vec<challenge_progress::Model>,
}

impl UserRecord {
    /// Builds a record with no nested data from a user row.
    #[must_use]
    pub fn from_user(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
            last_access_at: user.last_access_at,
            financial_data: None,
            transactions: Vec::new(),
            challenge_progress: Vec::new(),
        }
    }

    /// Whether the user finished onboarding and has a financial snapshot.
    #[must_use]
    pub const fn has_financial_data(&self) -> bool {
        self.financial_data.is_some()
    }
}

/// Retrieves every `USER`-role account with its nested data, newest registration first.
///
/// Snapshots and challenge rows are fetched with one query each for the whole page;
/// transactions are fetched per user so each one can be capped at
/// [`RECENT_TRANSACTION_LIMIT`].
#[instrument(skip(db))]
pub async fn fetch_user_directory(db: &DatabaseConnection) -> Result<Vec<UserRecord>> {
    let users = User::find()
        .filter(user::Column::Role.eq(Role::User))
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?;

    debug!("Loaded {} directory users", users.len());
    attach_nested_data(db, users).await
}

/// Retrieves a single `USER`-role account with its nested data.
///
/// Returns `None` when no such user exists or the account is not a `USER`.
#[instrument(skip(db))]
pub async fn fetch_user_record(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<UserRecord>> {
    let Some(user) = User::find_by_id(user_id)
        .filter(user::Column::Role.eq(Role::User))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let mut records = attach_nested_data(db, vec![user]).await?;
    Ok(records.pop())
}

/// Retrieves the most recent transactions of a user, newest first.
pub async fn get_recent_transactions(
    db: &DatabaseConnection,
    user_id: i64,
    limit: u64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn attach_nested_data(
    db: &DatabaseConnection,
    users: Vec<user::Model>,
) -> Result<Vec<UserRecord>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();

    let mut snapshots: HashMap<i64, financial_data::Model> = FinancialData::find()
        .filter(financial_data::Column::UserId.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|snapshot| (snapshot.user_id, snapshot))
        .collect();

    let mut progress: HashMap<i64, Vec<challenge_progress::Model>> = HashMap::new();
    for row in ChallengeProgress::find()
        .filter(challenge_progress::Column::UserId.is_in(ids))
        .order_by_asc(challenge_progress::Column::Day)
        .all(db)
        .await?
    {
        progress.entry(row.user_id).or_default().push(row);
    }

    let mut records = Vec::with_capacity(users.len());
    for user in users {
        let transactions =
            get_recent_transactions(db, user.id, RECENT_TRANSACTION_LIMIT).await?;
        let mut record = UserRecord::from_user(user);
        record.financial_data = snapshots.remove(&record.id);
        record.challenge_progress = progress.remove(&record.id).unwrap_or_default();
        record.transactions = transactions;
        records.push(record);
    }

    Ok(records)
}
