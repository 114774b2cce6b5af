use actix_web::web;

use crate::config::Config;
use crate::error::ApiError;
use crate::services::{
    chatbot_service::{ChatbotService, GeminiClient},
    fallback_resolver::{FallbackResolver, RetryPolicy},
    google_places_service::GooglePlacesService,
    photo_url_service::PhotoUrlResolver,
    route_annotation_service::{HttpRouteService, RouteAnnotator},
    route_generation_service::RouteGenerator,
    session_service::SessionRegistry,
};

pub mod chatbot;
pub mod health;
pub mod places;
pub mod route;
pub mod sessions;

/// Header carrying the client's session id for nearby lookups.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Everything the handlers share, built once at boot.
pub struct AppState {
    pub config: Config,
    pub resolver: FallbackResolver<GooglePlacesService>,
    pub annotator: RouteAnnotator<HttpRouteService>,
    pub generator: RouteGenerator,
    pub chatbot: ChatbotService<GeminiClient>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let places = GooglePlacesService::new(&config.google_maps_api_key, &config.places_api_base)?;
        let policy = RetryPolicy {
            base_delay: config.retry_base_delay,
            per_type_timeout: config.per_type_timeout,
            ..RetryPolicy::default()
        };
        let route_service = HttpRouteService::new(&config.route_service_url)?;
        let gemini = GeminiClient::from_config(&config)?;

        Ok(Self {
            resolver: FallbackResolver::with_policy(places, policy),
            annotator: RouteAnnotator::new(route_service),
            generator: RouteGenerator::new(),
            chatbot: ChatbotService::new(gemini),
            sessions: SessionRegistry::new(PhotoUrlResolver::from_config(&config)),
            config,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api")
            .route("/get-route", web::post().to(route::get_route))
            .route("/chatbot", web::post().to(chatbot::chatbot))
            .service(
                web::scope("/places")
                    .route("/nearby", web::get().to(places::nearby))
                    .route("/route", web::post().to(places::route)),
            )
            .route("/sessions/{id}", web::delete().to(sessions::end_session)),
    );
}
