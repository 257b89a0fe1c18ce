//! File upload handler (`/files`).

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResponse, ApiResult, FailureMessage};
use crate::storage::{sanitize_object_name, upload_all, UploadFile};
use crate::AppState;

const NO_FILES: &str = "No files to upload.";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload every file part of a multipart form and make it public.
///
/// Parts without a file name are ignored. Uploads run concurrently; the
/// request fails if any of them fails.
///
/// # Returns
/// - 200 OK with the public URLs, in part order
/// - 400 Bad Request if the form carries no files
/// - 500 Internal Server Error if any upload fails
#[utoipa::path(post, path = "/files", tag = "Files",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One or more file parts"),
    responses(
        (status = 200, description = "Public URLs of the uploaded files", body = [String]),
        (status = 400, description = "No files to upload."),
        (status = 500, description = "Failed to upload one or more files.")))]
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Vec<String>> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(subsystem = "storage", error = %rejection.body_text(), "Rejected upload body");
        ApiError::BadRequest(NO_FILES.to_string())
    })?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "Skipping non-file form field");
            continue;
        };
        let name = sanitize_object_name(&file_name)?;
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        files.push(UploadFile {
            name,
            content_type,
            bytes,
        });
    }

    let urls = upload_all(state.storage.as_ref(), &files)
        .await
        .or_fail("Failed to upload one or more files.")?;
    Ok(ApiResponse::ok("Files uploaded successfully", urls))
}
