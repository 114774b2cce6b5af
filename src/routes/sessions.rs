use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::routes::AppState;

/// Drops a session's query ticket and photo cache.
pub async fn end_session(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    if state.sessions.end(&id) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(json!({
            "error": format!("Session {} not found", id),
            "success": false,
        }))
    }
}
