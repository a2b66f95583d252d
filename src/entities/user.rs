//! User entity - Represents a registered account of the personal-finance application.
//!
//! Accounts are created and updated by other parts of the application (sign-up,
//! onboarding). The admin directory only reads them. Dashboard operators are users
//! with the `OWNER` role; the directory lists users with the `USER` role.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular customer of the application
    #[sea_orm(string_value = "USER")]
    User,
    /// Administrator allowed to use the dashboard
    #[sea_orm(string_value = "OWNER")]
    Owner,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, if the user provided one
    pub name: Option<String>,
    /// Login e-mail
    #[sea_orm(unique)]
    pub email: Option<String>,
    /// Contact phone number as typed by the user
    pub phone: Option<String>,
    /// Access level
    pub role: Role,
    /// Registration timestamp
    pub created_at: DateTimeUtc,
    /// Last time the user opened the application
    pub last_access_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user has at most one financial snapshot
    #[sea_orm(has_one = "super::financial_data::Entity")]
    FinancialData,
    /// A user has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// A user has many challenge progress rows
    #[sea_orm(has_many = "super::challenge_progress::Entity")]
    ChallengeProgress,
    /// A user may hold several sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::financial_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialData.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::challenge_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChallengeProgress.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
