use crate::error::LookupError;
use crate::models::{place::Place, query::PlaceQuery};

/// Nearby-search capability. An empty result is a successful lookup, not `NotFound`.
pub trait PlaceLookupClient {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>, LookupError>;
}
