use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

const FILE_FIELD: &str = "file";

/// Store the multipart `file` field in the upload directory.
///
/// Only the final path component of the client-supplied file name is used.
/// An existing file with the same name is overwritten.
pub async fn upload_file<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<ApiSuccess<UploadResponseData>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .and_then(sanitize_file_name)
            .ok_or_else(|| ApiError::BadRequest("Missing or invalid file name".to_string()))?;
        let contents = field.bytes().await?;

        let directory = &state.uploads.directory;
        tokio::fs::create_dir_all(directory).await.map_err(|e| {
            tracing::error!(directory = %directory.display(), error = %e, "Failed to create upload directory");
            ApiError::InternalServerError(format!("Failed to store file: {}", e))
        })?;

        let path = directory.join(&file_name);
        tokio::fs::write(&path, &contents).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to write uploaded file");
            ApiError::InternalServerError(format!("Failed to store file: {}", e))
        })?;

        tracing::info!(
            user_id = %user.id,
            file_name = %file_name,
            size = contents.len(),
            "File uploaded"
        );

        return Ok(ApiSuccess::new(
            StatusCode::OK,
            UploadResponseData {
                message: "File uploaded successfully".to_string(),
                file_name,
                size: contents.len(),
            },
        ));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponseData {
    pub message: String,
    pub file_name: String,
    pub size: usize,
}

/// Reduce a client file name to a single safe path component.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(&['/', '\\'][..]).next()?.trim();

    if name.is_empty() || name == "." || name == ".." || name.chars().any(char::is_control) {
        return None;
    }

    Some(name.to_string())
}
