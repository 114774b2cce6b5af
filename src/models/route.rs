use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

pub type DecodedPath = Vec<Coordinate>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedPolyline {
    #[serde(rename = "encodedPolyline")]
    pub encoded_polyline: String,
}

/// Body exchanged with the route service on `POST /api/get-route`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Coordinate>,
    #[serde(rename = "distanceMeters", skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u64>,
    /// Seconds with an `s` suffix, e.g. `"1800s"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyline: Option<EncodedPolyline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouteResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    #[serde(rename = "distanceMeters")]
    pub distance_meters: u64,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: u64,
    #[serde(rename = "encodedPolyline")]
    pub encoded_polyline: String,
}

impl RouteResult {
    pub fn minutes(&self) -> u64 {
        self.duration_seconds.div_ceil(60)
    }

    /// Meters as kilometers rounded to two decimals
    pub fn kilometers(&self) -> f64 {
        (self.distance_meters as f64 / 1000.0 * 100.0).round() / 100.0
    }
}

/// A route together with its decoded path and display values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRoute {
    #[serde(flatten)]
    pub route: RouteResult,
    pub path: DecodedPath,
    pub minutes: u64,
    pub kilometers: f64,
}

impl AnnotatedRoute {
    pub fn new(route: RouteResult, path: DecodedPath) -> Self {
        let minutes = route.minutes();
        let kilometers = route.kilometers();

        Self {
            route,
            path,
            minutes,
            kilometers,
        }
    }
}

/// Parses `"<seconds>s"`; fractional seconds round up.
pub fn parse_duration_seconds(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('s').unwrap_or(trimmed).trim();
    let seconds: f64 = number.parse().ok()?;

    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    Some(seconds.ceil() as u64)
}
