//! Work-site boundary checks.

use rust_decimal::prelude::ToPrimitive;

use crate::config::Geofence;
use crate::models::GeoPoint;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in metres (haversine).
///
/// Coordinates are converted to `f64` here; distances are never part of
/// monetary arithmetic.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = degrees(a.latitude.to_f64()).to_radians();
    let lat2 = degrees(b.latitude.to_f64()).to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (degrees(b.longitude.to_f64()) - degrees(a.longitude.to_f64())).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

fn degrees(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

/// Returns true when `point` lies inside `fence`, or when no fence is enforced.
///
/// # Examples
///
/// ```
/// use attendance_engine::attendance::is_within_geofence;
/// use attendance_engine::config::Geofence;
/// use attendance_engine::models::GeoPoint;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let office = GeoPoint::new(Decimal::from_str("10.7769").unwrap(), Decimal::from_str("106.7009").unwrap());
/// let fence = Geofence { center: office, radius_m: Decimal::from(100) };
///
/// assert!(is_within_geofence(Some(&fence), office));
/// assert!(is_within_geofence(None, GeoPoint::new(Decimal::ZERO, Decimal::ZERO)));
/// ```
pub fn is_within_geofence(fence: Option<&Geofence>, point: GeoPoint) -> bool {
    let Some(fence) = fence else {
        return true;
    };
    let radius = fence.radius_m.to_f64().unwrap_or(0.0);
    distance_m(fence.center, point) <= radius
}
