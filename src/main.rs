use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use trip_planner_api::{
    config::{mask_key, Config},
    routes::{self, AppState},
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    info!(
        "Places API key loaded ({}), routes from {}, chatbot {}",
        mask_key(&config.google_maps_api_key),
        config.route_service_url,
        if config.gemini_api_key.is_some() { "on Gemini" } else { "on canned replies" }
    );

    let host = config.host.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(config).map_err(|e| {
        error!("Failed to initialise services: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
