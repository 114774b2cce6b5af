//! Route annotation.
//!
//! Fetches distance, duration and an encoded polyline between two coordinates from the route
//! service and decodes the polyline into a drawable path. Any failure along the way yields no
//! route at all; it is logged and never reported to the caller as an error.

use std::time::Duration;

use log::{info, warn};

use crate::error::RouteUnavailable;
use crate::models::{
    coordinate::Coordinate,
    route::{parse_duration_seconds, AnnotatedRoute, RouteRequest, RouteResponse, RouteResult},
};
use crate::services::polyline;

/// Anything that can compute a route between two points.
pub trait RouteService {
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResponse, RouteUnavailable>;
}

/// Route service reached over HTTP (`POST` with `{origin, destination}`).
pub struct HttpRouteService {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRouteService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RouteUnavailable> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RouteService for HttpRouteService {
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResponse, RouteUnavailable> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&RouteRequest {
                origin,
                destination,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteUnavailable::Status(status.as_u16()));
        }

        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| RouteUnavailable::Malformed(e.to_string()))?;

        if !body.success {
            return Err(RouteUnavailable::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(body)
    }
}

pub struct RouteAnnotator<S> {
    service: S,
}

impl<S: RouteService> RouteAnnotator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns `None` whenever no usable route could be produced.
    pub async fn annotate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Option<AnnotatedRoute> {
        match self.try_annotate(origin, destination).await {
            Ok(route) => {
                info!(
                    "Route ready: {} km, {} min, {} points",
                    route.kilometers,
                    route.minutes,
                    route.path.len()
                );
                Some(route)
            }
            Err(e) => {
                warn!("Error fetching route: {}", e);
                None
            }
        }
    }

    async fn try_annotate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<AnnotatedRoute, RouteUnavailable> {
        if !origin.is_valid() || !destination.is_valid() {
            return Err(RouteUnavailable::Rejected(
                "origin and destination must be valid coordinates".to_string(),
            ));
        }

        let response = self.service.fetch_route(origin, destination).await?;
        let route = into_route_result(response)?;
        let path = polyline::decode(&route.encoded_polyline)
            .map_err(|e| RouteUnavailable::Malformed(e.to_string()))?;

        Ok(AnnotatedRoute::new(route, path))
    }
}

fn into_route_result(response: RouteResponse) -> Result<RouteResult, RouteUnavailable> {
    let distance_meters = response
        .distance_meters
        .ok_or_else(|| RouteUnavailable::Malformed("missing distanceMeters".to_string()))?;
    let duration = response
        .duration
        .ok_or_else(|| RouteUnavailable::Malformed("missing duration".to_string()))?;
    let duration_seconds = parse_duration_seconds(&duration).ok_or_else(|| {
        RouteUnavailable::Malformed(format!("unreadable duration '{}'", duration))
    })?;
    let encoded_polyline = response
        .polyline
        .map(|p| p.encoded_polyline)
        .ok_or_else(|| RouteUnavailable::Malformed("missing polyline".to_string()))?;

    Ok(RouteResult {
        distance_meters,
        duration_seconds,
        encoded_polyline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::EncodedPolyline;

    enum Canned {
        Route(RouteResponse),
        Refused(u16),
    }

    struct CannedRouteService(Canned);

    impl RouteService for CannedRouteService {
        async fn fetch_route(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<RouteResponse, RouteUnavailable> {
            match &self.0 {
                Canned::Route(response) => Ok(response.clone()),
                Canned::Refused(status) => Err(RouteUnavailable::Status(*status)),
            }
        }
    }

    fn answer(duration: &str, polyline: &str) -> RouteResponse {
        RouteResponse {
            success: true,
            distance_meters: Some(15234),
            duration: Some(duration.to_string()),
            polyline: Some(EncodedPolyline {
                encoded_polyline: polyline.to_string(),
            }),
            ..Default::default()
        }
    }

    fn annotator(canned: Canned) -> RouteAnnotator<CannedRouteService> {
        RouteAnnotator::new(CannedRouteService(canned))
    }

    fn origin() -> Coordinate {
        Coordinate::new(38.5, -120.2)
    }

    fn destination() -> Coordinate {
        Coordinate::new(43.252, -126.453)
    }

    #[tokio::test]
    async fn test_annotates_route() {
        let route = annotator(Canned::Route(answer("1800s", "_p~iF~ps|U_ulLnnqC_mqNvxq`@")))
            .annotate(origin(), destination())
            .await
            .unwrap();

        assert_eq!(route.minutes, 30);
        assert_eq!(route.kilometers, 15.23);
        assert_eq!(route.route.duration_seconds, 1800);
        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[0], Coordinate::new(38.5, -120.2));
    }

    #[tokio::test]
    async fn test_service_failure_gives_no_route() {
        assert!(annotator(Canned::Refused(503))
            .annotate(origin(), destination())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_bad_polyline_gives_no_route() {
        assert!(annotator(Canned::Route(answer("1800s", "_p~iF~ps|U_")))
            .annotate(origin(), destination())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_bad_duration_gives_no_route() {
        assert!(annotator(Canned::Route(answer("half an hour", "_p~iF~ps|U")))
            .annotate(origin(), destination())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_endpoints_are_not_sent() {
        assert!(annotator(Canned::Route(answer("1800s", "_p~iF~ps|U")))
            .annotate(Coordinate::new(f64::NAN, 0.0), destination())
            .await
            .is_none());
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let response = RouteResponse {
            success: true,
            ..Default::default()
        };

        assert!(matches!(
            into_route_result(response),
            Err(RouteUnavailable::Malformed(_))
        ));
    }
}
