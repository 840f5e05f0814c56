//! Straight-line distance between coordinates (meters)

#[allow(deprecated)]
use geo::HaversineDistance;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A (lat, lon) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[allow(deprecated)]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    p1.haversine_distance(&p2)
}

/// Equirectangular projection around the mean latitude.
///
/// Cheaper than haversine and accurate at city scale.
pub fn plane_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let x = ((lat1 + lat2) / 2.0).to_radians().cos() * d_lon;
    EARTH_RADIUS_M * (d_lat * d_lat + x * x).sqrt()
}

/// Which straight-line distance the beeline heuristic uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceCalc {
    #[default]
    Plane,
    Haversine,
}

impl DistanceCalc {
    pub fn distance(self, a: Coord, b: Coord) -> f64 {
        match self {
            DistanceCalc::Plane => plane_distance(a.lat, a.lon, b.lat, b.lon),
            DistanceCalc::Haversine => haversine_distance(a.lat, a.lon, b.lat, b.lon),
        }
    }
}
