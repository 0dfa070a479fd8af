use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const DEFAULT_PER_PAGE: u32 = 10;

const CSV_HEADER: [&str; 7] = [
    "id",
    "username",
    "name",
    "lastname",
    "birthday",
    "dni",
    "created_at",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportUsersQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

/// Download one page of the directory as a CSV attachment.
pub async fn export_users<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Query(query): Query<ExportUsersQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    )
    .map_err(UserError::from)?;

    let users = state.user_service.list_users(&page).await?;
    let body = render_csv(&users).map_err(|e| {
        tracing::error!(error = %e, "Failed to render CSV export");
        ApiError::InternalServerError(format!("Failed to render CSV: {}", e))
    })?;

    let disposition = format!("attachment; filename=users_data_page_{}.csv", page.page());
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn render_csv(users: &[User]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for user in users {
        writer.write_record([
            user.id.to_string(),
            user.username.to_string(),
            user.name.as_str().to_string(),
            user.lastname.as_str().to_string(),
            user.birthday.to_string(),
            user.dni.to_string(),
            user.created_at.to_rfc3339(),
        ])?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}
