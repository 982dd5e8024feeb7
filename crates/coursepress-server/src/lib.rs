pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;
use coursepress_core::paths;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Headroom on top of the avatar size limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the axum Router with all API routes, static previews, and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::new(root.clone())?;
    let upload_limit = app_state.config.uploads.max_avatar_bytes + MULTIPART_OVERHEAD;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::config::get_config))
        // Courses
        .route(
            "/courses",
            get(routes::courses::list_courses).post(routes::courses::create_course),
        )
        .route(
            "/courses/{id}",
            get(routes::courses::get_course)
                .put(routes::courses::update_course)
                .delete(routes::courses::delete_course),
        )
        .route("/courses/{id}/lessons", get(routes::courses::get_lessons))
        .route(
            "/courses/{id}/download",
            get(routes::courses::download_course),
        )
        // Moment files
        .route(
            "/courses/{id}/lessons/{lesson}/moments/{moment}",
            get(routes::moments::get_moment),
        )
        .route(
            "/courses/{id}/lessons/{lesson}/moments/{moment}/{file}",
            put(routes::moments::put_moment_file),
        )
        // Avatars
        .route(
            "/avatars",
            get(routes::avatars::list_avatars)
                .post(routes::avatars::upload_avatar)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/avatars/{name}",
            axum::routing::delete(routes::avatars::delete_avatar),
        )
        .fallback(routes::api_not_found);

    Ok(Router::new()
        .nest("/api", api)
        // Static previews of generated courses and avatar images
        .nest_service("/cursos", ServeDir::new(root.join(paths::COURSES_DIR)))
        .nest_service("/avatars", ServeDir::new(root.join(paths::AVATARS_DIR)))
        .nest_service(
            "/uploads/avatars",
            ServeDir::new(root.join(paths::UPLOADED_AVATARS_DIR)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

/// Start the CoursePress API server on a pre-bound listener. The caller binds
/// so it can report the actual port when `port = 0` lets the OS pick one.
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;

    tracing::info!("CoursePress server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/courses");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
