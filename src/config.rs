use std::{env, time::Duration};

use crate::error::ConfigError;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

pub const DEFAULT_PLACES_API_BASE: &str = "https://places.googleapis.com";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PHOTO_PLACEHOLDER: &str = "/images/main_img_placeholder.jpg";
pub const DEFAULT_PHOTO_URL_TEMPLATE: &str =
    "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference={reference}&key={key}";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub google_maps_api_key: String,
    pub places_api_base: String,
    pub photo_url_template: String,
    pub photo_placeholder: String,
    pub route_service_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub retry_base_delay: Duration,
    pub per_type_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => PORT,
        };

        let google_maps_api_key =
            get("GOOGLE_MAPS_API_KEY").ok_or(ConfigError::Missing("GOOGLE_MAPS_API_KEY"))?;

        let route_service_url = get("ROUTE_SERVICE_URL")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/get-route", port));
        url::Url::parse(&route_service_url).map_err(|e| ConfigError::Invalid {
            var: "ROUTE_SERVICE_URL",
            reason: e.to_string(),
        })?;

        let retry_base_ms = parse_number(get("RESOLVER_RETRY_BASE_MS"), "RESOLVER_RETRY_BASE_MS", 1000)?;
        let per_type_timeout_secs =
            parse_number(get("RESOLVER_TYPE_TIMEOUT_SECS"), "RESOLVER_TYPE_TIMEOUT_SECS", 10)?;

        Ok(Self {
            host,
            port,
            google_maps_api_key,
            places_api_base: get("PLACES_API_BASE")
                .unwrap_or_else(|| DEFAULT_PLACES_API_BASE.to_string()),
            photo_url_template: get("PHOTO_URL_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_PHOTO_URL_TEMPLATE.to_string()),
            photo_placeholder: get("PHOTO_PLACEHOLDER")
                .unwrap_or_else(|| DEFAULT_PHOTO_PLACEHOLDER.to_string()),
            route_service_url,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            retry_base_delay: Duration::from_millis(retry_base_ms),
            per_type_timeout: Duration::from_secs(per_type_timeout_secs),
        })
    }
}

fn parse_number(raw: Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        Some(raw) => match raw.trim().parse() {
            Ok(0) => Err(ConfigError::Invalid {
                var,
                reason: "must be greater than zero".to_string(),
            }),
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid {
                var,
                reason: format!("'{}' is not a whole number", raw),
            }),
        },
        None => Ok(default),
    }
}

/// Shows the first and last four characters of a secret
pub fn mask_key(key: &str) -> String {
    if key.len() > 8 && key.is_ascii() {
        format!("{}***{}", &key[0..4], &key[key.len() - 4..])
    } else {
        "***".to_string()
    }
}
