//! Reverse geocoding.
//!
//! Lookups are bounded by a timeout and never fail the calling operation:
//! any error, empty answer or timeout degrades to the coordinate text from
//! [`GeoPoint::fallback_address`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::models::GeoPoint;

/// Turns a coordinate into a human-readable address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the address for `point`, or `None` when it is unavailable.
    async fn resolve(&self, point: GeoPoint) -> Option<String>;
}

/// A geocoder with no provider behind it; every lookup falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGeocoder;

#[async_trait]
impl ReverseGeocoder for NoopGeocoder {
    async fn resolve(&self, _point: GeoPoint) -> Option<String> {
        None
    }
}

/// A geocoder answering every lookup with the same address.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    address: String,
}

impl StaticGeocoder {
    /// Creates a geocoder that always answers `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for StaticGeocoder {
    async fn resolve(&self, _point: GeoPoint) -> Option<String> {
        Some(self.address.clone())
    }
}

/// Resolves `point` within `timeout`, substituting the coordinate text on failure.
pub async fn resolve_address(
    geocoder: &dyn ReverseGeocoder,
    point: GeoPoint,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, geocoder.resolve(point)).await {
        Ok(Some(address)) if !address.trim().is_empty() => address,
        Ok(_) => {
            warn!(
                latitude = %point.latitude,
                longitude = %point.longitude,
                "Reverse geocoding returned no address, using coordinates"
            );
            point.fallback_address()
        }
        Err(_) => {
            warn!(
                latitude = %point.latitude,
                longitude = %point.longitude,
                timeout_ms = timeout.as_millis() as u64,
                "Reverse geocoding timed out, using coordinates"
            );
            point.fallback_address()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    struct SlowGeocoder;

    #[async_trait]
    impl ReverseGeocoder for SlowGeocoder {
        async fn resolve(&self, _point: GeoPoint) -> Option<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some("never".to_string())
        }
    }

    fn office() -> GeoPoint {
        GeoPoint::new(
            Decimal::from_str("10.7769").unwrap(),
            Decimal::from_str("106.7009").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_resolved_address_is_used() {
        let address =
            resolve_address(&StaticGeocoder::new("1 Le Loi"), office(), Duration::from_secs(1))
                .await;
        assert_eq!(address, "1 Le Loi");
    }

    #[tokio::test]
    async fn test_missing_address_falls_back_to_coordinates() {
        let address = resolve_address(&NoopGeocoder, office(), Duration::from_secs(1)).await;
        assert_eq!(address, "Lat: 10.776900, Long: 106.700900");
    }

    #[tokio::test]
    async fn test_blank_address_falls_back_to_coordinates() {
        let address =
            resolve_address(&StaticGeocoder::new("   "), office(), Duration::from_secs(1)).await;
        assert_eq!(address, "Lat: 10.776900, Long: 106.700900");
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_coordinates() {
        let address = resolve_address(&SlowGeocoder, office(), Duration::from_millis(50)).await;
        assert_eq!(address, "Lat: 10.776900, Long: 106.700900");
    }
}
