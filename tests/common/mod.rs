#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};

use trip_planner_api::config::Config;
use trip_planner_api::routes::{self, AppState};

pub const MAPS_KEY: &str = "test-maps-key-1234";

/// Types the fake provider was asked for, in call order.
#[derive(Default)]
pub struct ProviderCalls(Mutex<Vec<String>>);

impl ProviderCalls {
    pub fn types(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A running loopback stand-in for the places provider.
pub struct FakeProvider {
    pub base_url: String,
    pub calls: web::Data<ProviderCalls>,
}

async fn search_nearby(calls: web::Data<ProviderCalls>, body: web::Json<Value>) -> HttpResponse {
    let place_type = body["includedTypes"][0].as_str().unwrap_or_default().to_string();
    calls.0.lock().unwrap().push(place_type.clone());

    match place_type.as_str() {
        "restaurant" => HttpResponse::Ok().json(json!({
            "places": [
                {
                    "id": "r1",
                    "displayName": { "text": "Karim's", "languageCode": "en" },
                    "formattedAddress": "Jama Masjid, Old Delhi",
                    "location": { "latitude": 28.6496, "longitude": 77.2337 },
                    "rating": 4.3,
                    "photos": [{ "name": "places/r1/photos/abc" }]
                },
                {
                    "id": "r2",
                    "displayName": { "text": "Lost Diner" },
                    "location": { "latitude": "somewhere", "longitude": 77.2 }
                },
                {
                    "id": "r3",
                    "displayName": { "text": "Indian Accent" },
                    "location": { "latitude": 28.5921, "longitude": 77.2435 },
                    "photos": [{ "uri": "https://cdn.example.com/r3.jpg" }]
                }
            ]
        })),
        "lodging" => HttpResponse::Ok().json(json!({
            "places": [{
                "id": "h1",
                "displayName": { "text": "The Imperial" },
                "formattedAddress": "Janpath, New Delhi",
                "location": { "latitude": 28.6253, "longitude": 77.2185 },
                "rating": 4.7
            }]
        })),
        "ghost" => HttpResponse::Ok().json(json!({
            "places": [{ "id": "g1", "displayName": { "text": "Nowhere" } }]
        })),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            HttpResponse::Ok().json(json!({
                "places": [{
                    "id": "s1",
                    "displayName": { "text": "Late Cafe" },
                    "location": { "latitude": 28.61, "longitude": 77.21 }
                }]
            }))
        }
        "flaky" => HttpResponse::ServiceUnavailable().json(json!({
            "error": { "code": 503, "message": "Backend unavailable", "status": "UNAVAILABLE" }
        })),
        "limited" => HttpResponse::TooManyRequests().json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })),
        "bogus" => HttpResponse::BadRequest().json(json!({
            "error": { "code": 400, "message": "Unsupported types: bogus.", "status": "INVALID_ARGUMENT" }
        })),
        _ => HttpResponse::Ok().json(json!({})),
    }
}

pub async fn spawn_fake_provider() -> FakeProvider {
    let calls = web::Data::new(ProviderCalls::default());
    let data = calls.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/v1/places:searchNearby", web::post().to(search_nearby))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    FakeProvider {
        base_url: format!("http://{}", addr),
        calls,
    }
}

pub fn test_config(places_base: &str, route_service_url: &str) -> Config {
    let values: HashMap<&str, String> = HashMap::from([
        ("GOOGLE_MAPS_API_KEY", MAPS_KEY.to_string()),
        ("PLACES_API_BASE", places_base.to_string()),
        ("ROUTE_SERVICE_URL", route_service_url.to_string()),
        ("RESOLVER_RETRY_BASE_MS", "1".to_string()),
        ("RESOLVER_TYPE_TIMEOUT_SECS", "5".to_string()),
    ]);

    Config::from_lookup(|key| values.get(key).cloned()).unwrap()
}

/// Serves the whole API on a loopback port, for use as a real route service.
pub async fn spawn_api(config: Config) -> String {
    let state = web::Data::new(AppState::new(config).unwrap());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    format!("http://{}", addr)
}

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new(config: Config) -> Self {
        Self {
            state: web::Data::new(AppState::new(config).unwrap()),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::configure)
    }
}
