//! Nearby search against the Google Places API (v1 `places:searchNearby`).
//!
//! One candidate type per request. Provider records are normalised into [`Place`] values here:
//! missing or non-numeric coordinates become NaN (the sanitizer drops them later), ratings outside
//! [0, 5] are discarded and photo shapes are classified into [`PhotoRef`] variants.

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LookupError;
use crate::models::{
    coordinate::Coordinate,
    place::{PhotoRef, Place},
    query::PlaceQuery,
};
use crate::services::place_lookup::PlaceLookupClient;

pub const MAX_RESULT_COUNT: u32 = 20;
const FIELD_MASK: &str =
    "places.id,places.displayName,places.formattedAddress,places.location,places.rating,places.photos";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyRequest {
    included_types: Vec<String>,
    max_result_count: u32,
    location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: Coordinate,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct SearchNearbyResponse {
    #[serde(default)]
    places: Vec<ProviderPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderPlace {
    id: Option<String>,
    display_name: Option<DisplayName>,
    formatted_address: Option<String>,
    location: Option<ProviderLatLng>,
    rating: Option<f64>,
    #[serde(default)]
    photos: Option<Vec<ProviderPhoto>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DisplayName {
    Plain(String),
    Localized { text: String },
}

#[derive(Debug, Deserialize)]
struct ProviderLatLng {
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderPhoto {
    Token(String),
    Direct {
        #[serde(alias = "photoUri")]
        uri: String,
    },
    Named {
        name: String,
    },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl ProviderPhoto {
    fn into_photo_ref(self) -> Option<PhotoRef> {
        match self {
            ProviderPhoto::Token(token) => Some(PhotoRef::LegacyToken(token)),
            ProviderPhoto::Direct { uri } => Some(PhotoRef::DirectUri(uri)),
            ProviderPhoto::Named { name } => Some(PhotoRef::NamedResource(name)),
            ProviderPhoto::Other(_) => None,
        }
    }
}

impl ProviderPlace {
    fn into_place(self, index: usize) -> Place {
        let location = match self.location {
            Some(latlng) => Coordinate::new(
                latlng.latitude.as_f64().unwrap_or(f64::NAN),
                latlng.longitude.as_f64().unwrap_or(f64::NAN),
            ),
            None => Coordinate::new(f64::NAN, f64::NAN),
        };

        let name = match self.display_name {
            Some(DisplayName::Plain(text)) | Some(DisplayName::Localized { text }) => text,
            None => String::new(),
        };

        Place {
            id: self.id.unwrap_or_else(|| format!("unidentified_{}", index)),
            name,
            address: self.formatted_address.unwrap_or_default(),
            location,
            rating: self
                .rating
                .filter(|r| r.is_finite() && (0.0..=5.0).contains(r)),
            photo_refs: self
                .photos
                .unwrap_or_default()
                .into_iter()
                .filter_map(ProviderPhoto::into_photo_ref)
                .collect(),
        }
    }
}

/// Remote [`PlaceLookupClient`] backed by the Google Places API.
pub struct GooglePlacesService {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesService {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/places:searchNearby", self.base_url)
    }
}

impl PlaceLookupClient for GooglePlacesService {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>, LookupError> {
        let place_type = match query.candidate_types.as_slice() {
            [single] => single.clone(),
            types => {
                return Err(LookupError::InvalidArgument(format!(
                    "expected exactly one candidate type per request, got {}",
                    types.len()
                )))
            }
        };

        let request = SearchNearbyRequest {
            included_types: vec![place_type.clone()],
            max_result_count: MAX_RESULT_COUNT,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: query.center,
                    radius: query.radius_meters as f64,
                },
            },
        };

        debug!(
            "Searching nearby {} around ({:.4}, {:.4})",
            place_type, query.center.latitude, query.center.longitude
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: SearchNearbyResponse = response.json().await.map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to parse places response: {}", e))
        })?;

        if body.places.is_empty() {
            warn!(
                "No {} places returned for ({:.4}, {:.4})",
                place_type, query.center.latitude, query.center.longitude
            );
        }

        Ok(body
            .places
            .into_iter()
            .enumerate()
            .map(|(index, place)| place.into_place(index))
            .collect())
    }
}

fn classify_failure(status: StatusCode, body: &str) -> LookupError {
    let detail = serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| {
            format!(
                "{} {}",
                e.status.unwrap_or_default(),
                e.message.unwrap_or_default()
            )
            .trim()
            .to_string()
        })
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => LookupError::RateLimited(detail),
        StatusCode::NOT_FOUND => LookupError::NotFound(detail),
        s if s.is_server_error() => LookupError::ServiceUnavailable(detail),
        _ => LookupError::InvalidArgument(detail),
    }
}
