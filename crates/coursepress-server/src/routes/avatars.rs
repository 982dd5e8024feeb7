use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use coursepress_core::avatar::{self, Avatar};
use coursepress_core::types::AvatarSource;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/avatars: built-in and uploaded avatars. Both directories are
/// read concurrently.
pub async fn list_avatars(State(app): State<AppState>) -> Result<Json<Vec<Avatar>>, AppError> {
    let builtin_root = app.root.clone();
    let uploaded_root = app.root.clone();
    let (builtin, uploaded) = tokio::join!(
        tokio::task::spawn_blocking(move || avatar::list_source(&builtin_root, AvatarSource::Builtin)),
        tokio::task::spawn_blocking(move || avatar::list_source(&uploaded_root, AvatarSource::Uploaded)),
    );

    let mut all = builtin.map_err(AppError::join)??;
    all.extend(uploaded.map_err(AppError::join)??);
    Ok(Json(all))
}

/// POST /api/avatars: multipart upload, image in the `file` field.
pub async fn upload_avatar(
    State(app): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Avatar>), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_err)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("upload field 'file' has no file name"))?;
        let bytes = field.bytes().await.map_err(upload_err)?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::bad_request("missing multipart field 'file'"))?;
    let root = app.root.clone();
    let limit = app.config.uploads.max_avatar_bytes;
    let saved = tokio::task::spawn_blocking(move || avatar::save_avatar(&root, &filename, &bytes, limit))
        .await
        .map_err(AppError::join)??;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// A body cut off by the request size limit is a 413, anything else a 400.
fn upload_err(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(e.body_text())
    } else {
        AppError::bad_request(format!("malformed upload: {}", e.body_text()))
    }
}

/// DELETE /api/avatars/:name: remove an uploaded avatar.
pub async fn delete_avatar(
    State(app): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(name) = name.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let deleted = name.clone();
    tokio::task::spawn_blocking(move || avatar::delete_avatar(&root, &deleted))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "name": name, "deleted": true })))
}
