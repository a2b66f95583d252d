//! Core business logic - framework-agnostic directory, filtering, statistics and
//! report generation.
//!
//! Nothing in here knows about HTTP. Database access is limited to [`directory`];
//! every other module is a pure transformation of [`directory::UserRecord`] values.

/// CSV export of the whole directory
pub mod csv_export;
/// Detail view and chart datasets for one user
pub mod detail;
/// Loading users with their nested financial data
pub mod directory;
/// Free-text and date range filtering
pub mod filter;
/// Fixed-locale date, currency and slug formatting
pub mod format;
/// Per-user PDF reports
pub mod pdf_report;
/// Summary counters
pub mod stats;
