use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::config::mask_key;
use crate::routes::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn degraded(details: String) -> Self {
        Self {
            status: "degraded".to_string(),
            details: Some(details),
        }
    }
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let config = &state.config;
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health.services.insert(
        "places".to_string(),
        ServiceStatus::ok(format!(
            "Places API key configured ({}), endpoint {}",
            mask_key(&config.google_maps_api_key),
            config.places_api_base
        )),
    );

    health.services.insert(
        "route_service".to_string(),
        ServiceStatus::ok(format!("Routes from {}", state.annotator.service().endpoint())),
    );

    let chatbot = if state.chatbot.is_generating() {
        ServiceStatus::ok(format!("Gemini model {}", config.gemini_model))
    } else {
        ServiceStatus::degraded("GEMINI_API_KEY not configured, serving canned replies".to_string())
    };
    if chatbot.status != "ok" {
        health.status = "degraded".to_string();
    }
    health.services.insert("chatbot".to_string(), chatbot);

    HttpResponse::Ok().json(health)
}
