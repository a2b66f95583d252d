//! Dashboard state - the operator-facing side of the directory.
//!
//! [`Dashboard`] owns the fetched user list and the current filter inputs, and keeps
//! the filtered view in sync: every input change re-runs the filter synchronously.
//! Outcomes the operator should see (load failures, finished exports) are queued as
//! [`Notice`]s instead of being returned as errors.

/// HTTP client for the directory endpoint
pub mod client;

pub use client::DirectoryClient;

use crate::{
    api::auth::Identity,
    config::ReportSettings,
    core::{
        csv_export::{self, CsvExport},
        detail::{self, UserDetail},
        directory::UserRecord,
        filter::{self, DateRange},
        pdf_report::{self, PdfReport},
        stats::{self, DirectoryStats},
    },
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// Where to send someone who may not see the dashboard, if anywhere
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Operator may load the dashboard
    Proceed,
    /// Leave the page for this path before loading anything
    Redirect(&'static str),
}

/// Decides whether the dashboard may load for the current identity.
///
/// Visitors without a session go to the sign-in page; signed-in users without the
/// `OWNER` role go to their own dashboard.
#[must_use]
pub fn gate(identity: Option<&Identity>) -> Gate {
    match identity {
        None => Gate::Redirect("/auth"),
        Some(identity) if !identity.is_owner() => Gate::Redirect("/dashboard"),
        Some(_) => Gate::Proceed,
    }
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An action finished
    Success,
    /// An action failed
    Error,
}

/// A transient message for the operator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the operator
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.to_string(),
        }
    }
}

/// State of the admin dashboard page
#[derive(Debug)]
pub struct Dashboard {
    settings: ReportSettings,
    users: Vec<UserRecord>,
    filtered: Vec<UserRecord>,
    query: String,
    range: DateRange,
    loading: bool,
    selected: Option<i64>,
    notices: Vec<Notice>,
}

impl Dashboard {
    /// Creates an empty dashboard in the loading state.
    #[must_use]
    pub const fn new(settings: ReportSettings) -> Self {
        Self {
            settings,
            users: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            range: DateRange::All,
            loading: true,
            selected: None,
            notices: Vec::new(),
        }
    }

    /// Opens the page for `identity`.
    ///
    /// The directory is fetched only when the gate lets the identity through; otherwise
    /// nothing is requested and the redirect is returned for the caller to follow.
    pub async fn open(&mut self, identity: Option<&Identity>, client: &DirectoryClient) -> Gate {
        let decision = gate(identity);
        match decision {
            Gate::Proceed => self.load(client).await,
            Gate::Redirect(to) => debug!("Dashboard redirecting to {}", to),
        }
        decision
    }

    /// Fetches the directory. On failure the list stays empty and an error notice is
    /// queued; the loading flag clears either way.
    async fn load(&mut self, client: &DirectoryClient) {
        match client.fetch_users().await {
            Ok(users) => {
                info!("Dashboard loaded {} users", users.len());
                self.set_users(users);
            }
            Err(e) => {
                warn!("Failed to load users: {}", e);
                self.notices.push(Notice::error("Erro ao carregar usuários"));
            }
        }
        self.loading = false;
    }

    /// Replaces the full list and re-runs the filter.
    pub fn set_users(&mut self, users: Vec<UserRecord>) {
        self.users = users;
        self.refilter();
    }

    /// Changes the search text and re-runs the filter.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Changes the date range and re-runs the filter.
    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
        self.refilter();
    }

    fn refilter(&mut self) {
        let now = Utc::now().with_timezone(&self.settings.display_offset());
        self.filtered = filter::filter_users(&self.users, &self.query, self.range, &now)
            .into_iter()
            .cloned()
            .collect();
    }

    /// Whether the initial load is still pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The full, unfiltered list.
    #[must_use]
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    /// The users matching the current query and date range.
    #[must_use]
    pub fn filtered(&self) -> &[UserRecord] {
        &self.filtered
    }

    /// Current search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Summary counters over the full list.
    #[must_use]
    pub fn stats(&self) -> DirectoryStats {
        stats::compute_stats(&self.users)
    }

    /// Selects a user for the detail view. Returns `false` for unknown ids.
    pub fn select(&mut self, user_id: i64) -> bool {
        let known = self.find(user_id).is_some();
        self.selected = known.then_some(user_id);
        known
    }

    /// Detail view data of the selected user.
    #[must_use]
    pub fn selected_detail(&self) -> Option<UserDetail> {
        let user = self.find(self.selected?)?;
        Some(detail::user_detail(user, &self.settings.display_offset()))
    }

    /// Exports the full list as CSV and queues a notice with the outcome.
    pub fn export_csv(&mut self, now: &DateTime<Utc>) -> Option<CsvExport> {
        match csv_export::export_users_csv(&self.users, now, &self.settings) {
            Ok(export) => {
                self.notices.push(Notice::success("CSV de usuários gerado!"));
                Some(export)
            }
            Err(e) => {
                error!("CSV export failed: {}", e);
                self.notices.push(Notice::error("Erro ao gerar CSV"));
                None
            }
        }
    }

    /// Generates a user's PDF report and queues a notice with the outcome.
    pub fn user_report(&mut self, user_id: i64, now: &DateTime<Utc>) -> Option<PdfReport> {
        let result = self
            .find(user_id)
            .map(|user| pdf_report::generate_user_report(user, now, &self.settings));

        match result {
            Some(Ok(report)) => {
                self.notices
                    .push(Notice::success("Relatório do cliente gerado!"));
                Some(report)
            }
            Some(Err(e)) => {
                error!("Report for user {} failed: {}", user_id, e);
                self.notices.push(Notice::error("Erro ao gerar relatório"));
                None
            }
            None => {
                self.notices.push(Notice::error("Usuário não encontrado"));
                None
            }
        }
    }

    /// Queued notices, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns the queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn find(&self, user_id: i64) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == user_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        api::{AppState, router},
        entities::Role,
        errors::Result,
        test_utils::*,
    };
    use chrono::Duration;
    use sea_orm::DatabaseConnection;

    async fn serve(db: DatabaseConnection) -> Result<String> {
        let app = router(AppState::new(db, ReportSettings::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}"))
    }

    const fn owner_identity(user_id: i64) -> Identity {
        Identity {
            user_id,
            role: Role::Owner,
        }
    }

    fn loaded_dashboard() -> Dashboard {
        let mut ana = sample_record(
            Some("Ana"),
            Some(sample_financial_data(5000.0, 3000.0, 500.0, 0.0, 0.0)),
        );
        ana.email = Some("ana@example.com".to_string());
        let mut bruno = sample_record(Some("Bruno"), None);
        bruno.created_at = Utc::now() - Duration::days(40);

        let mut dashboard = Dashboard::new(ReportSettings::default());
        dashboard.set_users(vec![ana, bruno]);
        dashboard
    }

    #[test]
    fn test_gate() {
        let owner = Identity {
            user_id: 1,
            role: Role::Owner,
        };
        let user = Identity {
            user_id: 2,
            role: Role::User,
        };
        assert_eq!(gate(None), Gate::Redirect("/auth"));
        assert_eq!(gate(Some(&user)), Gate::Redirect("/dashboard"));
        assert_eq!(gate(Some(&owner)), Gate::Proceed);
    }

    #[test]
    fn test_inputs_refilter_immediately() {
        let mut dashboard = loaded_dashboard();
        assert_eq!(dashboard.filtered().len(), 2);

        dashboard.set_query("ANA@");
        assert_eq!(dashboard.filtered().len(), 1);
        assert_eq!(dashboard.filtered()[0].name.as_deref(), Some("Ana"));

        dashboard.set_query("");
        dashboard.set_range(DateRange::Month);
        assert_eq!(dashboard.filtered().len(), 1);
        assert_eq!(dashboard.range(), DateRange::Month);

        dashboard.set_range(DateRange::All);
        assert_eq!(dashboard.filtered().len(), 2);
    }

    #[test]
    fn test_stats_ignore_filters() {
        let mut dashboard = loaded_dashboard();
        dashboard.set_query("nobody");

        let stats = dashboard.stats();

        assert!(dashboard.filtered().is_empty());
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.users_with_data, 1);
        assert_eq!(stats.avg_income, 5000.0);
        assert_eq!(stats.total_debts, 500.0);
    }

    #[test]
    fn test_selection_and_detail() {
        let mut dashboard = loaded_dashboard();
        let ana_id = dashboard.users()[0].id;

        assert!(!dashboard.select(-1));
        assert!(dashboard.selected_detail().is_none());
        assert!(dashboard.select(ana_id));

        let detail = dashboard.selected_detail().unwrap();
        assert_eq!(detail.name, "Ana");
        assert_eq!(detail.charts.unwrap().debts.values, vec![500.0, 0.0, 0.0]);
    }

    #[test]
    fn test_exports_queue_notices() {
        let mut dashboard = loaded_dashboard();
        let now = Utc::now();
        let bruno_id = dashboard.users()[1].id;

        assert!(dashboard.export_csv(&now).is_some());
        assert!(dashboard.user_report(bruno_id, &now).is_some());
        assert!(dashboard.user_report(-1, &now).is_none());

        let notices = dashboard.take_notices();
        let levels: Vec<NoticeLevel> = notices.iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![NoticeLevel::Success, NoticeLevel::Success, NoticeLevel::Error]
        );
        assert!(dashboard.notices().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_api() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_owner(&db).await?;
        create_test_session(&db, owner.id, "owner-token").await?;
        let ana = create_test_user(&db, "Ana").await?;
        create_test_financial_data(&db, ana.id, 4200.0, 1000.0).await?;
        create_test_user(&db, "Bruno").await?;
        let base_url = serve(db).await?;

        let mut dashboard = Dashboard::new(ReportSettings::default());
        assert!(dashboard.is_loading());
        let client = DirectoryClient::new(base_url, "owner-token");
        let decision = dashboard.open(Some(&owner_identity(owner.id)), &client).await;

        assert_eq!(decision, Gate::Proceed);

        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.users().len(), 2);
        assert_eq!(dashboard.filtered().len(), 2);
        assert_eq!(dashboard.stats().avg_income, 4200.0);
        assert!(dashboard.notices().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_rejected_by_api_leaves_list_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Ana").await?;
        create_test_session(&db, user.id, "user-token").await?;
        let base_url = serve(db).await?;

        // A stale owner identity on the page while the API sees a USER session
        let mut dashboard = Dashboard::new(ReportSettings::default());
        let client = DirectoryClient::new(base_url, "user-token");
        dashboard.open(Some(&owner_identity(user.id)), &client).await;

        assert!(!dashboard.is_loading());
        assert!(dashboard.users().is_empty());
        assert_eq!(
            dashboard.notices(),
            &[Notice::error("Erro ao carregar usuários")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_load_network_failure() {
        // Bind then drop a listener to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut dashboard = Dashboard::new(ReportSettings::default());
        let client = DirectoryClient::new(format!("http://{addr}"), "token");
        dashboard.open(Some(&owner_identity(1)), &client).await;

        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.notices().len(), 1);
        assert_eq!(dashboard.notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_redirected_identities_never_fetch() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_owner(&db).await?;
        create_test_session(&db, owner.id, "owner-token").await?;
        create_test_user(&db, "Ana").await?;
        let base_url = serve(db).await?;
        // The client could load the directory; only the gate stops it
        let client = DirectoryClient::new(base_url, "owner-token");
        let user = Identity {
            user_id: owner.id + 1,
            role: Role::User,
        };

        let mut dashboard = Dashboard::new(ReportSettings::default());
        assert_eq!(
            dashboard.open(Some(&user), &client).await,
            Gate::Redirect("/dashboard")
        );
        assert_eq!(dashboard.open(None, &client).await, Gate::Redirect("/auth"));

        assert!(dashboard.users().is_empty());
        assert!(dashboard.notices().is_empty());
        assert!(dashboard.is_loading());
        Ok(())
    }
}
