// src/geopoint.rs

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A latitude/longitude pair, sent as `{"__type": "GeoPoint", "latitude": .., "longitude": ..}`.
///
/// Deserialization goes through [`ParseGeoPoint::new`], so out-of-range coordinates are
/// rejected on the way in as well.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "__type", rename = "GeoPoint", try_from = "WireGeoPoint")]
pub struct ParseGeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
#[serde(tag = "__type", rename = "GeoPoint")]
struct WireGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<WireGeoPoint> for ParseGeoPoint {
    type Error = ParseError;

    fn try_from(point: WireGeoPoint) -> Result<Self, Self::Error> {
        ParseGeoPoint::new(point.latitude, point.longitude)
    }
}

impl ParseGeoPoint {
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ParseError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ParseError::InvalidInput(format!(
                "Latitude must be between -90 and 90 degrees, got {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ParseError::InvalidInput(format!(
                "Longitude must be between -180 and 180 degrees, got {}",
                longitude
            )));
        }
        Ok(ParseGeoPoint {
            latitude,
            longitude,
        })
    }
}
