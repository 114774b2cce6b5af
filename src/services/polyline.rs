//! Encoded polyline codec (precision 5).
//!
//! Each coordinate is stored as the delta from the previous one, scaled by 1e5, zig-zag encoded
//! and split into 5-bit chunks, low chunk first. Every chunk except the last of a value carries
//! the 0x20 continuation bit, and every byte is offset by 63 into printable ASCII.

use crate::error::PolylineError;
use crate::models::{coordinate::Coordinate, route::DecodedPath};

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: u8 = 63;

pub fn decode(encoded: &str) -> Result<DecodedPath, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut path = Vec::new();
    let mut position = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while position < bytes.len() {
        latitude = latitude
            .checked_add(next_value(bytes, &mut position)?)
            .ok_or(PolylineError::Overflow(position))?;
        if position >= bytes.len() {
            return Err(PolylineError::Truncated);
        }
        longitude = longitude
            .checked_add(next_value(bytes, &mut position)?)
            .ok_or(PolylineError::Overflow(position))?;

        let coordinate = Coordinate::new(latitude as f64 / PRECISION, longitude as f64 / PRECISION);
        if !coordinate.is_valid() {
            return Err(PolylineError::OutOfRange(position));
        }
        path.push(coordinate);
    }

    Ok(path)
}

fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*position).ok_or(PolylineError::Truncated)?;
        if !(ASCII_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                position: *position,
            });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow(*position));
        }

        let chunk = (byte - ASCII_OFFSET) as i64;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        *position += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

pub fn encode(path: &[Coordinate]) -> Result<String, PolylineError> {
    let mut encoded = String::new();
    let mut previous = (0i64, 0i64);

    for coordinate in path {
        if !coordinate.is_valid() {
            return Err(PolylineError::NonFinite);
        }

        let latitude = (coordinate.latitude * PRECISION).round() as i64;
        let longitude = (coordinate.longitude * PRECISION).round() as i64;

        push_value(&mut encoded, latitude - previous.0);
        push_value(&mut encoded, longitude - previous.1);
        previous = (latitude, longitude);
    }

    Ok(encoded)
}

fn push_value(out: &mut String, value: i64) {
    let mut remaining = if value < 0 { !(value << 1) } else { value << 1 };

    while remaining >= CONTINUATION {
        out.push((((remaining & CHUNK_MASK) | CONTINUATION) as u8 + ASCII_OFFSET) as char);
        remaining >>= CHUNK_BITS;
    }
    out.push((remaining as u8 + ASCII_OFFSET) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round5(value: f64) -> f64 {
        (value * PRECISION).round() / PRECISION
    }

    #[test]
    fn test_decode_reference_polyline() {
        let path = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();

        assert_eq!(
            path,
            vec![
                Coordinate::new(38.5, -120.2),
                Coordinate::new(40.7, -120.95),
                Coordinate::new(43.252, -126.453),
            ]
        );
    }

    #[test]
    fn test_encode_reference_path() {
        let path = vec![
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ];

        assert_eq!(encode(&path).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let encoded = "o}gnA~h}jFz@|@z@|@z@|@z@|@z@|@";
        let first = decode(encoded).unwrap();
        let second = decode(encoded).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_round_trip_on_rounded_coordinates() {
        let path: Vec<Coordinate> = [
            (28.6139, 77.209),
            (28.7041, 77.1025),
            (-33.86785, 151.20732),
            (0.0, 0.0),
            (-89.99999, -179.99999),
            (90.0, 180.0),
        ]
        .iter()
        .map(|&(lat, lng)| Coordinate::new(round5(lat), round5(lng)))
        .collect();

        let decoded = decode(&encode(&path).unwrap()).unwrap();

        assert_eq!(decoded.len(), path.len());
        for (a, b) in decoded.iter().zip(path.iter()) {
            assert!((a.latitude - b.latitude).abs() < 1e-9);
            assert!((a.longitude - b.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode("").unwrap(), Vec::new());
        assert_eq!(encode(&[]).unwrap(), "");
    }

    #[test]
    fn test_malformed_input() {
        // dangling continuation chunk
        assert_eq!(decode("_p~iF~ps|"), Err(PolylineError::Truncated));
        // latitude without longitude
        assert_eq!(decode("_p~iF"), Err(PolylineError::Truncated));
        assert!(matches!(
            decode("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter { character: ' ', position: 5 })
        ));
        assert!(matches!(decode(&"~".repeat(20)), Err(PolylineError::Overflow(_))));
    }

    #[test]
    fn test_huge_values_are_rejected_without_panicking() {
        let encoded = format!("{}F?", "~".repeat(12)).repeat(3);

        let result = std::panic::catch_unwind(|| decode(&encoded));

        assert!(matches!(
            result.expect("decode must not panic"),
            Err(PolylineError::OutOfRange(_)) | Err(PolylineError::Overflow(_))
        ));
    }

    #[test]
    fn test_decoded_points_stay_in_range() {
        // latitude delta of +9_000_001 (90.00001 degrees), longitude 0
        let mut encoded = String::new();
        push_value(&mut encoded, 9_000_001);
        push_value(&mut encoded, 0);

        assert_eq!(decode(&encoded), Err(PolylineError::OutOfRange(encoded.len())));

        let mut boundary = String::new();
        push_value(&mut boundary, 9_000_000);
        push_value(&mut boundary, -18_000_000);
        assert_eq!(decode(&boundary).unwrap(), vec![Coordinate::new(90.0, -180.0)]);
    }

    #[test]
    fn test_encode_rejects_invalid_coordinates() {
        assert_eq!(
            encode(&[Coordinate::new(f64::NAN, 1.0)]),
            Err(PolylineError::NonFinite)
        );
    }
}
