//! Transaction entity - Income and expense entries recorded by users.
//!
//! The `amount` is always a non-negative magnitude; whether it adds or subtracts
//! is given by `type`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming in
    #[sea_orm(string_value = "INCOME")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

impl TransactionType {
    /// Localized label used in reports (`Receita` / `Despesa`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Receita",
            Self::Expense => "Despesa",
        }
    }

    /// Sign shown in front of the amount.
    #[must_use]
    pub const fn sign(self) -> char {
        match self {
            Self::Income => '+',
            Self::Expense => '-',
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user this transaction belongs to
    pub user_id: i64,
    /// When the transaction happened
    pub date: DateTimeUtc,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-text description typed by the user
    pub description: String,
    /// Non-negative amount
    pub amount: f64,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
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
