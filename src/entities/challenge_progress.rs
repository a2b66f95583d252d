//! Challenge progress entity - Daily steps of the savings challenge.
//!
//! The directory passes these rows through to the dashboard untouched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Challenge progress database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenge_progress")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of this progress row
    pub user_id: i64,
    /// Challenge day number, starting at 1
    pub day: i32,
    /// Whether the day's task was completed
    pub completed: bool,
    /// When it was completed
    pub completed_at: Option<DateTimeUtc>,
}

/// Defines relationships between `ChallengeProgress` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one user
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
