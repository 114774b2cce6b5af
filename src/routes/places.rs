use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{
    coordinate::Coordinate,
    place::PlaceView,
    route::{AnnotatedRoute, RouteRequest},
};
use crate::routes::{AppState, SESSION_HEADER};
use crate::services::{
    fallback_resolver::{Resolution, ResolutionSource},
    session_service::NearbySession,
};

/// Priority list used when the caller does not name any types.
pub const DEFAULT_TYPES: [&str; 3] = ["tourist_attraction", "restaurant", "lodging"];

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    lat: Option<f64>,
    lng: Option<f64>,
    types: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub places: Vec<PlaceView>,
    pub source: ResolutionSource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteEnvelope {
    pub route: Option<AnnotatedRoute>,
}

pub async fn nearby(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<NearbyParams>,
) -> Result<HttpResponse, ApiError> {
    let origin = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
        _ => return Err(ApiError::BadRequest("lat and lng are required.".to_string())),
    };
    if !origin.is_valid() {
        return Err(ApiError::BadRequest(format!(
            "({}, {}) is not a valid coordinate.",
            origin.latitude, origin.longitude
        )));
    }
    let types = candidate_types(params.types.as_deref());

    let session_id = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let Some(session_id) = session_id else {
        let resolution = state.resolver.resolve(origin, &types).await;
        let mut session = state.sessions.ephemeral();
        return Ok(HttpResponse::Ok().json(render(&mut session, resolution)));
    };

    let ticket = state
        .sessions
        .with_session(&session_id, |session| session.begin(origin, types.clone()));
    let resolution = state.resolver.resolve(origin, &types).await;

    state
        .sessions
        .with_existing(&session_id, |session| {
            session
                .accept(&ticket, resolution)
                .map(|resolution| render(session, resolution))
        })
        .flatten()
        .map(|body| HttpResponse::Ok().json(body))
        .ok_or_else(|| {
            info!("Nearby query {} in session {} was superseded", ticket.id, session_id);
            ApiError::Superseded
        })
}

pub async fn route(state: web::Data<AppState>, body: web::Json<RouteRequest>) -> HttpResponse {
    let RouteRequest {
        origin,
        destination,
    } = body.into_inner();

    HttpResponse::Ok().json(RouteEnvelope {
        route: state.annotator.annotate(origin, destination).await,
    })
}

fn render(session: &mut NearbySession, resolution: Resolution) -> NearbyResponse {
    let photos = session.photos();
    let places = resolution
        .places
        .into_iter()
        .map(|place| {
            let url = photos.resolve_url(&place);
            PlaceView::new(place, url)
        })
        .collect();

    NearbyResponse {
        places,
        source: resolution.source,
    }
}

fn candidate_types(raw: Option<&str>) -> Vec<String> {
    let types: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if types.is_empty() {
        DEFAULT_TYPES.iter().map(|t| t.to_string()).collect()
    } else {
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_types() {
        assert_eq!(candidate_types(None), DEFAULT_TYPES.to_vec());
        assert_eq!(candidate_types(Some(" , ")), DEFAULT_TYPES.to_vec());
        assert_eq!(
            candidate_types(Some("lodging, cafe,,museum")),
            vec!["lodging", "cafe", "museum"]
        );
    }
}
