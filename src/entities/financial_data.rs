//! Financial data entity - The single current financial snapshot of a user.
//!
//! There is no history: onboarding overwrites the one row per user. All amounts
//! are non-negative and expressed in the same currency.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Financial snapshot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_data")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the snapshot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the snapshot (at most one snapshot per user)
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Monthly income
    pub monthly_income: f64,
    /// Monthly expenses
    pub monthly_expenses: f64,
    /// Outstanding credit card debt
    pub credit_card_debt: f64,
    /// Outstanding loan debt
    pub loan_debt: f64,
    /// Outstanding overdraft debt
    pub overdraft_debt: f64,
}

impl Model {
    /// Sum of the three debt categories.
    #[must_use]
    pub fn total_debts(&self) -> f64 {
        self.credit_card_debt + self.loan_debt + self.overdraft_debt
    }

    /// Income minus expenses. May be negative; charts floor it at zero.
    #[must_use]
    pub fn free_total(&self) -> f64 {
        self.monthly_income - self.monthly_expenses
    }
}

/// Defines relationships between `FinancialData` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each snapshot belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
