//! Shared test utilities.
//!
//! This module provides helpers for setting up in-memory test databases, inserting
//! rows the main application would normally create, and building in-memory
//! [`UserRecord`] values for the pure report and filter logic.

#![allow(clippy::expect_used)]

use crate::{
    core::directory::UserRecord,
    entities::{
        Role, TransactionType, challenge_progress, financial_data, session, transaction, user,
    },
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::atomic::{AtomicI64, Ordering};

static NEXT_SAMPLE_ID: AtomicI64 = AtomicI64::new(1);

fn next_sample_id() -> i64 {
    NEXT_SAMPLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a `USER`-role account registered now.
///
/// # Defaults
/// * `email`: the lowercased name with spaces replaced by dots, at `example.com`
/// * `phone`: `"+55 11 90000-0000"`
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<user::Model> {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    create_custom_user(db, Some(name), Some(&email), Role::User, Utc::now()).await
}

/// Creates an `OWNER` account, i.e. a dashboard operator.
pub async fn create_test_owner(db: &DatabaseConnection) -> Result<user::Model> {
    create_custom_user(
        db,
        Some("Operador"),
        Some("owner@example.com"),
        Role::Owner,
        Utc::now(),
    )
    .await
}

/// Creates an account with custom identity, role and registration date.
pub async fn create_custom_user(
    db: &DatabaseConnection,
    name: Option<&str>,
    email: Option<&str>,
    role: Role,
    created_at: DateTime<Utc>,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        name: Set(name.map(ToString::to_string)),
        email: Set(email.map(ToString::to_string)),
        phone: Set(Some("+55 11 90000-0000".to_string())),
        role: Set(role),
        created_at: Set(created_at),
        last_access_at: Set(created_at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a financial snapshot with the given income and expenses and no debts.
pub async fn create_test_financial_data(
    db: &DatabaseConnection,
    user_id: i64,
    monthly_income: f64,
    monthly_expenses: f64,
) -> Result<financial_data::Model> {
    let model = financial_data::ActiveModel {
        user_id: Set(user_id),
        monthly_income: Set(monthly_income),
        monthly_expenses: Set(monthly_expenses),
        credit_card_debt: Set(0.0),
        loan_debt: Set(0.0),
        overdraft_debt: Set(0.0),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a transaction with custom parameters.
pub async fn create_custom_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    date: DateTime<Utc>,
    kind: TransactionType,
    description: &str,
    amount: f64,
) -> Result<transaction::Model> {
    let model = transaction::ActiveModel {
        user_id: Set(user_id),
        date: Set(date),
        kind: Set(kind),
        description: Set(description.to_string()),
        amount: Set(amount),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a challenge progress row for the given day.
pub async fn create_test_challenge_progress(
    db: &DatabaseConnection,
    user_id: i64,
    day: i32,
    completed: bool,
) -> Result<challenge_progress::Model> {
    let model = challenge_progress::ActiveModel {
        user_id: Set(user_id),
        day: Set(day),
        completed: Set(completed),
        completed_at: Set(completed.then(Utc::now)),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a session that expires in one hour.
pub async fn create_test_session(
    db: &DatabaseConnection,
    user_id: i64,
    token: &str,
) -> Result<session::Model> {
    create_custom_session(db, user_id, token, Utc::now() + Duration::hours(1)).await
}

/// Creates a session with a custom expiry.
pub async fn create_custom_session(
    db: &DatabaseConnection,
    user_id: i64,
    token: &str,
    expires: DateTime<Utc>,
) -> Result<session::Model> {
    let model = session::ActiveModel {
        session_token: Set(token.to_string()),
        user_id: Set(user_id),
        expires: Set(expires),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Builds an in-memory record with a unique id, registered now, and no
/// transactions.
pub fn sample_record(
    name: Option<&str>,
    financial_data: Option<financial_data::Model>,
) -> UserRecord {
    let now = Utc::now();
    let id = next_sample_id();
    UserRecord {
        id,
        name: name.map(ToString::to_string),
        email: Some(format!("user{id}@example.com")),
        phone: None,
        role: Role::User,
        created_at: now,
        last_access_at: now,
        financial_data: financial_data.map(|data| financial_data::Model {
            user_id: id,
            ..data
        }),
        transactions: Vec::new(),
        challenge_progress: Vec::new(),
    }
}

/// Builds an in-memory financial snapshot.
pub fn sample_financial_data(
    monthly_income: f64,
    monthly_expenses: f64,
    credit_card_debt: f64,
    loan_debt: f64,
    overdraft_debt: f64,
) -> financial_data::Model {
    financial_data::Model {
        id: next_sample_id(),
        user_id: 0,
        monthly_income,
        monthly_expenses,
        credit_card_debt,
        loan_debt,
        overdraft_debt,
    }
}

/// Builds an in-memory transaction.
pub fn sample_transaction(
    kind: TransactionType,
    description: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> transaction::Model {
    transaction::Model {
        id: next_sample_id(),
        user_id: 0,
        date,
        kind,
        description: description.to_string(),
        amount,
    }
}

/// Finds a record by id, panicking when it is missing.
pub fn find_record(records: &[UserRecord], id: i64) -> &UserRecord {
    records
        .iter()
        .find(|record| record.id == id)
        .expect("record should be present")
}
