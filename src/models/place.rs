use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

/// Photo reference shapes returned by the places provider, classified once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PhotoRef {
    /// Photo object that already exposes a direct URI
    DirectUri(String),
    /// Photo object identified by its resource name (which may itself be a URL)
    NamedResource(String),
    /// Bare reference token from the legacy places API
    LegacyToken(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
    pub rating: Option<f64>,
    #[serde(rename = "photoRefs", default)]
    pub photo_refs: Vec<PhotoRef>,
}

impl Place {
    pub fn first_photo(&self) -> Option<&PhotoRef> {
        self.photo_refs.first()
    }
}

/// Place as returned to API consumers, with its photo already resolved to a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
    pub rating: Option<f64>,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
}

impl PlaceView {
    pub fn new(place: Place, photo_url: String) -> Self {
        Self {
            id: place.id,
            name: place.name,
            address: place.address,
            location: place.location,
            rating: place.rating,
            photo_url,
        }
    }
}
