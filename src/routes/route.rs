use actix_web::{web, HttpResponse};
use log::error;
use serde_json::Value;

use crate::models::{coordinate::Coordinate, route::RouteResponse};
use crate::routes::AppState;

const MISSING_ENDPOINTS: &str = "Origin and destination are required.";
const MISSING_COORDINATES: &str = "Origin and destination must include latitude and longitude.";
const INVALID_COORDINATES: &str = "Origin and destination must be valid coordinates.";

pub async fn get_route(state: web::Data<AppState>, body: Option<web::Json<Value>>) -> HttpResponse {
    let body = body.map(web::Json::into_inner).unwrap_or(Value::Null);

    let (origin, destination) = match endpoints(&body) {
        Ok(endpoints) => endpoints,
        Err(message) => return HttpResponse::BadRequest().json(RouteResponse::failure(message)),
    };

    match state.generator.generate(origin, destination) {
        Ok(route) => HttpResponse::Ok().json(route),
        Err(e) => {
            error!("Error in /api/get-route: {}", e);
            HttpResponse::InternalServerError().json(RouteResponse::failure("Internal server error"))
        }
    }
}

fn endpoints(body: &Value) -> Result<(Coordinate, Coordinate), &'static str> {
    let (Some(origin), Some(destination)) = (present(body, "origin"), present(body, "destination"))
    else {
        return Err(MISSING_ENDPOINTS);
    };

    let (Some(origin), Some(destination)) = (coordinate(origin), coordinate(destination)) else {
        return Err(MISSING_COORDINATES);
    };

    if !origin.is_valid() || !destination.is_valid() {
        return Err(INVALID_COORDINATES);
    }

    Ok((origin, destination))
}

fn present<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|value| !value.is_null())
}

fn coordinate(value: &Value) -> Option<Coordinate> {
    Some(Coordinate::new(
        value.get("latitude")?.as_f64()?,
        value.get("longitude")?.as_f64()?,
    ))
}
