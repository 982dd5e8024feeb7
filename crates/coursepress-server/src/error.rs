use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursepress_core::CoursePressError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

/// Carries an explicit HTTP 413 through the `anyhow::Error` chain.
#[derive(Debug)]
struct PayloadTooLargeError(String);

impl std::fmt::Display for PayloadTooLargeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PayloadTooLargeError {}

// ---------------------------------------------------------------------------
// AppError, the unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    /// Construct a 413 Payload Too Large error.
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self(PayloadTooLargeError(msg.into()).into())
    }

    /// Wrap a `spawn_blocking` join failure.
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        if self.0.downcast_ref::<PayloadTooLargeError>().is_some() {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }

        match self.0.downcast_ref::<CoursePressError>() {
            Some(e) => match e {
                CoursePressError::CourseNotFound(_)
                | CoursePressError::LessonNotFound { .. }
                | CoursePressError::MomentNotFound { .. }
                | CoursePressError::AvatarNotFound(_) => StatusCode::NOT_FOUND,
                CoursePressError::CourseExists(_) => StatusCode::CONFLICT,
                CoursePressError::NotInitialized
                | CoursePressError::InvalidSlug(_)
                | CoursePressError::InvalidMomentType(_)
                | CoursePressError::InvalidMomentFile(_)
                | CoursePressError::InvalidCourse(_) => StatusCode::BAD_REQUEST,
                CoursePressError::UnsupportedAvatarType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                CoursePressError::AvatarTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                CoursePressError::Catalog(_)
                | CoursePressError::Archive(_)
                | CoursePressError::Io(_)
                | CoursePressError::Yaml(_)
                | CoursePressError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
