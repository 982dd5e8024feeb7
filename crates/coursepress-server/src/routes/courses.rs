use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use coursepress_core::course::{CourseData, CourseDraft, Lesson};
use coursepress_core::catalog::CourseRecord;
use coursepress_core::{package, paths, CoursePressError};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/courses: catalog rows, oldest first.
pub async fn list_courses(State(app): State<AppState>) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let catalog = app.catalog.clone();
    let records = tokio::task::spawn_blocking(move || catalog.list())
        .await
        .map_err(AppError::join)??;
    Ok(Json(records))
}

/// POST /api/courses: create a course from the submitted form.
pub async fn create_course(
    State(app): State<AppState>,
    body: Result<Json<CourseDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CourseData>), AppError> {
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let catalog = app.catalog.clone();
    let course = tokio::task::spawn_blocking(move || {
        let course = CourseData::create(&root, body)?;
        catalog.upsert(&course.summary())?;
        Ok::<_, CoursePressError>(course)
    })
    .await
    .map_err(AppError::join)??;

    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/:id: full course metadata.
pub async fn get_course(
    State(app): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<CourseData>, AppError> {
    let Path(id) = id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let course = tokio::task::spawn_blocking(move || CourseData::load(&root, &id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(course))
}

/// PUT /api/courses/:id: re-save the form, rewriting the whole course tree.
pub async fn update_course(
    State(app): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<CourseDraft>, JsonRejection>,
) -> Result<Json<CourseData>, AppError> {
    let Path(id) = id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let catalog = app.catalog.clone();
    let course = tokio::task::spawn_blocking(move || {
        let course = CourseData::update(&root, &id, body)?;
        catalog.upsert(&course.summary())?;
        Ok::<_, CoursePressError>(course)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(course))
}

/// DELETE /api/courses/:id: remove the course folder and its catalog row.
///
/// A row whose folder is already gone is still removed.
pub async fn delete_course(
    State(app): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let catalog = app.catalog.clone();
    let result = tokio::task::spawn_blocking(move || {
        paths::validate_slug(&id)?;
        let removed_dir = CourseData::delete(&root, &id);
        let removed_row = catalog.remove(&id)?;
        match removed_dir {
            Ok(()) => {}
            Err(CoursePressError::CourseNotFound(_)) if removed_row => {}
            Err(e) => return Err(e),
        }
        Ok(serde_json::json!({ "id": id, "deleted": true }))
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(result))
}

/// GET /api/courses/:id/lessons: lesson structure, defaulted when the
/// metadata file is missing.
pub async fn get_lessons(
    State(app): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let Path(id) = id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let lessons = tokio::task::spawn_blocking(move || CourseData::lessons_or_default(&root, &id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(lessons))
}

/// GET /api/courses/:id/download: SCORM ZIP built on the fly.
pub async fn download_course(
    State(app): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let root = app.root.clone();
    let (filename, bytes) = tokio::task::spawn_blocking(move || {
        let course = CourseData::load(&root, &id)?;
        let bytes = package::export_zip(&root, &id)?;
        Ok::<_, CoursePressError>((package::archive_name(&course), bytes))
    })
    .await
    .map_err(AppError::join)??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
