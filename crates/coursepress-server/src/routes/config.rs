use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/config: workspace settings plus validation warnings.
pub async fn get_config(State(app): State<AppState>) -> Json<serde_json::Value> {
    let cfg = &app.config;
    Json(serde_json::json!({
        "version": cfg.version,
        "site": cfg.site,
        "server": cfg.server,
        "uploads": cfg.uploads,
        "warnings": cfg.validate(),
    }))
}
