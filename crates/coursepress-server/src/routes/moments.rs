use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use coursepress_core::moment::{self, MomentFiles};
use coursepress_core::types::MomentFile;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/courses/:id/lessons/:lesson/moments/:moment: html, css and js.
pub async fn get_moment(
    State(app): State<AppState>,
    params: Result<Path<(String, u32, u32)>, PathRejection>,
) -> Result<Json<MomentFiles>, AppError> {
    let Path((id, lesson, moment)) = params.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let files = tokio::task::spawn_blocking(move || moment::load_moment(&root, &id, lesson, moment))
        .await
        .map_err(AppError::join)??;
    Ok(Json(files))
}

#[derive(serde::Deserialize)]
pub struct SaveMomentFileBody {
    pub content: String,
}

/// PUT /api/courses/:id/lessons/:lesson/moments/:moment/:file: overwrite one file.
pub async fn put_moment_file(
    State(app): State<AppState>,
    params: Result<Path<(String, u32, u32, String)>, PathRejection>,
    body: Result<Json<SaveMomentFileBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path((id, lesson, moment, file)) =
        params.map_err(|e| AppError::bad_request(e.body_text()))?;
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let file: MomentFile = file.parse()?;
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || {
        moment::save_moment_file(&root, &id, lesson, moment, file, &body.content)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({
        "ok": true,
        "file": file.filename(),
    })))
}
