//! Mock route generator behind `POST /api/get-route`.
//!
//! Produces a plausible distance and duration at random; the polyline is the straight segment
//! from origin to destination.

use rand::Rng;

use crate::error::PolylineError;
use crate::models::{
    coordinate::Coordinate,
    route::{EncodedPolyline, RouteResponse},
};
use crate::services::polyline;

pub const MIN_DISTANCE_METERS: u64 = 1000;
pub const DISTANCE_SPAN_METERS: u64 = 10_000;
pub const MIN_DURATION_SECONDS: u64 = 300;
pub const DURATION_SPAN_SECONDS: u64 = 3600;

#[derive(Debug, Default, Clone)]
pub struct RouteGenerator;

impl RouteGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResponse, PolylineError> {
        self.generate_with(&mut rand::thread_rng(), origin, destination)
    }

    pub fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResponse, PolylineError> {
        let encoded_polyline = polyline::encode(&[origin, destination])?;
        let distance = MIN_DISTANCE_METERS + rng.gen_range(0..DISTANCE_SPAN_METERS);
        let duration = MIN_DURATION_SECONDS + rng.gen_range(0..DURATION_SPAN_SECONDS);

        Ok(RouteResponse {
            success: true,
            origin: Some(origin),
            destination: Some(destination),
            distance_meters: Some(distance),
            duration: Some(format!("{}s", duration)),
            polyline: Some(EncodedPolyline { encoded_polyline }),
            error: None,
        })
    }
}
