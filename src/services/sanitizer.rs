use log::warn;

use crate::models::place::Place;

pub struct ResultSanitizer;

impl ResultSanitizer {
    /// Drops places whose location is missing, NaN or out of range. Keeps order and duplicates.
    pub fn sanitize(places: Vec<Place>) -> Vec<Place> {
        places
            .into_iter()
            .filter(|place| {
                let valid = place.location.is_valid();
                if !valid {
                    warn!(
                        "Filtering out place {} ({}) without a valid location",
                        place.id, place.name
                    );
                }
                valid
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coordinate::Coordinate;

    fn place(id: &str, latitude: f64, longitude: f64) -> Place {
        Place {
            id: id.to_string(),
            name: format!("Place {}", id),
            address: String::new(),
            location: Coordinate::new(latitude, longitude),
            rating: None,
            photo_refs: Vec::new(),
        }
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_removes_exactly_the_invalid_entries() {
        let places = vec![
            place("a", 28.61, 77.2),
            place("missing", f64::NAN, f64::NAN),
            place("b", 0.0, 0.0),
            place("lat_out", 95.0, 10.0),
            place("c", -33.86, 151.2),
            place("lng_out", 10.0, -181.0),
            place("inf", f64::INFINITY, 3.0),
            place("a", 28.61, 77.2),
        ];

        let sanitized = ResultSanitizer::sanitize(places);

        assert_eq!(ids(&sanitized), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_idempotent() {
        let places = vec![
            place("a", 1.0, 1.0),
            place("bad", f64::NAN, 1.0),
            place("b", 2.0, 2.0),
        ];

        let once = ResultSanitizer::sanitize(places);
        let twice = ResultSanitizer::sanitize(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(ResultSanitizer::sanitize(Vec::new()).is_empty());
    }
}
