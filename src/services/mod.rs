pub mod chatbot_service;
pub mod fallback_resolver;
pub mod google_places_service;
pub mod photo_url_service;
pub mod place_lookup;
pub mod polyline;
pub mod route_annotation_service;
pub mod route_generation_service;
pub mod sanitizer;
pub mod session_service;
pub mod synthetic_places_service;
