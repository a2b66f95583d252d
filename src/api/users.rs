//! Admin endpoints over the user directory.
//!
//! Each handler takes an [`Operator`], so the `OWNER` check runs before any data is
//! loaded. Report endpoints return the generated file as an attachment.

use crate::{
    api::{AppState, auth::Operator},
    core::{
        csv_export,
        detail::{self, UserDetail},
        directory::{self, UserRecord},
        filter::{self, DateRange},
        pdf_report,
        stats::{self, DirectoryStats},
    },
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State},
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::{info, instrument};

/// Characters left unescaped in the RFC 5987 `filename*` parameter
const FILENAME_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// Optional filters accepted by the directory endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    /// Free-text search over name, e-mail and phone
    pub q: Option<String>,
    /// `all`, `today`, `week` or `month`
    pub range: Option<String>,
}

/// Numeric user id taken from the request path.
///
/// Unparsable ids are rejected with the JSON error body instead of axum's plain-text
/// rejection.
#[derive(Clone, Copy, Debug)]
pub struct UserId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::InvalidParameter {
                message: rejection.body_text(),
            })?;
        Ok(Self(id))
    }
}

/// `GET /api/admin/users` - every `USER` account with nested data, newest first.
///
/// Without query parameters the full directory is returned.
#[instrument(skip_all, fields(operator = operator.0.user_id))]
pub async fn list_users(
    operator: Operator,
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<UserRecord>>> {
    let range = query
        .range
        .as_deref()
        .map_or(Ok(DateRange::All), str::parse::<DateRange>)?;
    let text = query.q.unwrap_or_default();

    let users = directory::fetch_user_directory(&state.db).await?;
    let total = users.len();

    let users = if text.is_empty() && range == DateRange::All {
        users
    } else {
        let now = Utc::now().with_timezone(&state.reports.display_offset());
        filter::filter_users(&users, &text, range, &now)
            .into_iter()
            .cloned()
            .collect()
    };

    info!("Returning {} of {} directory users", users.len(), total);
    Ok(Json(users))
}

/// `GET /api/admin/stats` - summary counters over the full directory.
#[instrument(skip_all, fields(operator = operator.0.user_id))]
pub async fn get_stats(
    operator: Operator,
    State(state): State<AppState>,
) -> Result<Json<DirectoryStats>> {
    let users = directory::fetch_user_directory(&state.db).await?;
    Ok(Json(stats::compute_stats(&users)))
}

/// `GET /api/admin/users/{id}` - detail view data for one user.
#[instrument(skip_all, fields(operator = operator.0.user_id, user_id))]
pub async fn get_user_detail(
    operator: Operator,
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<UserDetail>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(detail::user_detail(&user, &state.reports.display_offset())))
}

/// `GET /api/admin/users/export.csv` - the whole directory as a CSV attachment.
#[instrument(skip_all, fields(operator = operator.0.user_id))]
pub async fn export_users_csv(
    operator: Operator,
    State(state): State<AppState>,
) -> Result<Response> {
    let users = directory::fetch_user_directory(&state.db).await?;
    let export = csv_export::export_users_csv(&users, &Utc::now(), &state.reports)?;
    info!("Exported {} users to {}", users.len(), export.file_name);

    attachment("text/csv; charset=utf-8", &export.file_name, export.content)
}

/// `GET /api/admin/users/{id}/report.pdf` - a user's PDF report as an attachment.
#[instrument(skip_all, fields(operator = operator.0.user_id, user_id))]
pub async fn get_user_report(
    operator: Operator,
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Response> {
    let user = load_user(&state, user_id).await?;
    let report = pdf_report::generate_user_report(&user, &Utc::now(), &state.reports)?;
    info!("Generated report {}", report.file_name);

    attachment("application/pdf", &report.file_name, report.bytes)
}

async fn load_user(state: &AppState, user_id: i64) -> Result<UserRecord> {
    tracing::Span::current().record("user_id", user_id);
    directory::fetch_user_record(&state.db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

fn attachment(
    content_type: &'static str,
    file_name: &str,
    body: impl IntoResponse,
) -> Result<Response> {
    let disposition = content_disposition(file_name)?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII `filename` fallback and the exact name in
/// `filename*`.
fn content_disposition(file_name: &str) -> Result<HeaderValue> {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, FILENAME_SAFE);

    HeaderValue::try_from(format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .map_err(|e| Error::Report {
        message: format!("Invalid download name {file_name:?}: {e}"),
    })
}
