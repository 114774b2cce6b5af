use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::LookupError;
use crate::models::{coordinate::Coordinate, place::Place, query::PlaceQuery};
use crate::services::place_lookup::PlaceLookupClient;

const DEFAULT_COUNT: usize = 3;
/// Total jitter span in degrees; offsets fall within half of it either side of the center.
const JITTER_DEGREES: f64 = 0.01;
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const ADDRESS_TEMPLATES: [&str; 3] = [
    "Nearby {type} near your location",
    "Another nearby {type} location",
    "Popular {type} in the area",
];

/// Placeholder places generated around the query center when no real data is available.
/// The same query always yields the same places.
#[derive(Debug, Clone)]
pub struct SyntheticPlaceLookupClient {
    count: usize,
}

impl Default for SyntheticPlaceLookupClient {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
        }
    }
}

impl SyntheticPlaceLookupClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(count: usize) -> Self {
        Self { count }
    }

    pub fn generate(&self, query: &PlaceQuery) -> Vec<Place> {
        let place_type = query.primary_type();
        let mut rng = StdRng::seed_from_u64(seed_for(place_type, &query.center));
        let label = capitalize(place_type);

        (1..=self.count)
            .map(|k| {
                let d_lat = (rng.gen::<f64>() - 0.5) * JITTER_DEGREES;
                let d_lng = (rng.gen::<f64>() - 0.5) * JITTER_DEGREES;
                let rating = rng.gen_range(1..=5) as f64;
                let address = ADDRESS_TEMPLATES[(k - 1) % ADDRESS_TEMPLATES.len()]
                    .replace("{type}", place_type);

                Place {
                    id: format!("synthetic_{}_{}", place_type, k),
                    name: format!("Sample {} {}", label, k),
                    address,
                    location: query.center.offset(d_lat, d_lng),
                    rating: Some(rating),
                    photo_refs: Vec::new(),
                }
            })
            .collect()
    }
}

impl PlaceLookupClient for SyntheticPlaceLookupClient {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>, LookupError> {
        Ok(self.generate(query))
    }
}

/// FNV-1a over the type tag and the center's bit patterns, stable across toolchains.
fn seed_for(place_type: &str, center: &Coordinate) -> u64 {
    place_type
        .bytes()
        .chain(center.latitude.to_bits().to_le_bytes())
        .chain(center.longitude.to_bits().to_le_bytes())
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
        })
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
