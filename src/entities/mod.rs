//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the tables owned by the main application; this crate only reads them.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod challenge_progress;
pub mod financial_data;
pub mod session;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use challenge_progress::{
    Column as ChallengeProgressColumn, Entity as ChallengeProgress,
    Model as ChallengeProgressModel,
};
pub use financial_data::{
    Column as FinancialDataColumn, Entity as FinancialData, Model as FinancialDataModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
