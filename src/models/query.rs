use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::models::coordinate::Coordinate;

/// Radius used for every nearby lookup issued by the resolver.
pub const DEFAULT_RADIUS_METERS: u32 = 5000;

/// A nearby lookup: center, radius and candidate type tags ordered by priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceQuery {
    pub center: Coordinate,
    #[serde(rename = "radiusMeters")]
    pub radius_meters: u32,
    #[serde(rename = "candidateTypes")]
    pub candidate_types: Vec<String>,
}

impl PlaceQuery {
    pub fn new(
        center: Coordinate,
        radius_meters: u32,
        candidate_types: Vec<String>,
    ) -> Result<Self, LookupError> {
        if !center.is_valid() {
            return Err(LookupError::InvalidArgument(format!(
                "center ({}, {}) is not a valid coordinate",
                center.latitude, center.longitude
            )));
        }
        if radius_meters == 0 {
            return Err(LookupError::InvalidArgument(
                "radius must be positive".to_string(),
            ));
        }
        if candidate_types.is_empty() || candidate_types.iter().any(|t| t.trim().is_empty()) {
            return Err(LookupError::InvalidArgument(
                "candidate types must be a non-empty list of tags".to_string(),
            ));
        }

        Ok(Self {
            center,
            radius_meters,
            candidate_types,
        })
    }

    /// Single-type query at the default radius, the shape the resolver sends per attempt.
    pub fn for_type(center: Coordinate, place_type: &str) -> Result<Self, LookupError> {
        Self::new(center, DEFAULT_RADIUS_METERS, vec![place_type.to_string()])
    }

    pub fn primary_type(&self) -> &str {
        self.candidate_types
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}
