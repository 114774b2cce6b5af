//! Fallback resolution of nearby places.
//!
//! Candidate types are tried strictly one after another. Transient failures (rate limiting,
//! provider unavailable) are retried with exponential backoff; the first type whose sanitized
//! result is non-empty wins. When every type comes back empty or failed, synthetic places seeded
//! with the first candidate type are returned instead, so a resolution is never empty.

use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};

use crate::error::LookupError;
use crate::models::{
    coordinate::Coordinate,
    place::Place,
    query::{PlaceQuery, DEFAULT_RADIUS_METERS},
};
use crate::services::{
    place_lookup::PlaceLookupClient, sanitizer::ResultSanitizer,
    synthetic_places_service::SyntheticPlaceLookupClient,
};

/// Seed type for synthetic places when no candidate type was supplied.
pub const DEFAULT_CANDIDATE_TYPE: &str = "tourist_attraction";

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound for one candidate type, retries and backoff included
    pub per_type_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            per_type_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based): base, 2 * base, 4 * base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackReason {
    /// Every candidate type answered, none with places
    NoResults,
    /// At least one candidate type could not be checked
    ProviderUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolutionSource {
    Provider {
        #[serde(rename = "placeType")]
        place_type: String,
    },
    Synthetic {
        reason: FallbackReason,
    },
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub places: Vec<Place>,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, ResolutionSource::Synthetic { .. })
    }
}

pub struct FallbackResolver<C> {
    remote: C,
    synthetic: SyntheticPlaceLookupClient,
    policy: RetryPolicy,
}

impl<C: PlaceLookupClient> FallbackResolver<C> {
    pub fn new(remote: C) -> Self {
        Self::with_policy(remote, RetryPolicy::default())
    }

    pub fn with_policy(remote: C, policy: RetryPolicy) -> Self {
        Self {
            remote,
            synthetic: SyntheticPlaceLookupClient::new(),
            policy,
        }
    }

    pub fn remote(&self) -> &C {
        &self.remote
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn resolve(&self, origin: Coordinate, candidate_types: &[String]) -> Resolution {
        let mut provider_failed = false;

        for place_type in candidate_types {
            info!("Trying place type: {}", place_type);

            match self.lookup_type(origin, place_type).await {
                Ok(places) if !places.is_empty() => {
                    info!("Found {} results with type: {}", places.len(), place_type);
                    return Resolution {
                        places,
                        source: ResolutionSource::Provider {
                            place_type: place_type.clone(),
                        },
                    };
                }
                Ok(_) => info!("No results for {}, trying next type", place_type),
                Err(LookupError::NotFound(message)) => {
                    info!("No data for {} in this region: {}", place_type, message)
                }
                Err(err) => {
                    warn!("Lookup for {} failed: {}", place_type, err);
                    provider_failed = true;
                }
            }
        }

        let reason = if provider_failed {
            FallbackReason::ProviderUnavailable
        } else {
            FallbackReason::NoResults
        };
        let seed_type = candidate_types
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_CANDIDATE_TYPE);

        warn!("Using synthetic {} places as fallback ({:?})", seed_type, reason);

        let query = PlaceQuery {
            center: origin,
            radius_meters: DEFAULT_RADIUS_METERS,
            candidate_types: vec![seed_type.to_string()],
        };

        Resolution {
            places: self.synthetic.generate(&query),
            source: ResolutionSource::Synthetic { reason },
        }
    }

    async fn lookup_type(
        &self,
        origin: Coordinate,
        place_type: &str,
    ) -> Result<Vec<Place>, LookupError> {
        let query = PlaceQuery::for_type(origin, place_type)?;

        match timeout(self.policy.per_type_timeout, self.search_with_retry(&query)).await {
            Ok(result) => result.map(ResultSanitizer::sanitize),
            Err(_) => Err(LookupError::ServiceUnavailable(format!(
                "no answer for {} within {:?}",
                place_type, self.policy.per_type_timeout
            ))),
        }
    }

    async fn search_with_retry(&self, query: &PlaceQuery) -> Result<Vec<Place>, LookupError> {
        let mut retry = 0;

        loop {
            match self.remote.search(query).await {
                Ok(places) => return Ok(places),
                Err(err) if err.is_transient() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay_for(retry);
                    warn!(
                        "Lookup for {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        query.primary_type(),
                        retry,
                        self.policy.max_retries + 1,
                        err,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
