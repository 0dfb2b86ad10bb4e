use crate::core::config::GeolocationConfig;
use crate::core::geo::LatLng;
use crate::input::events::NoticeKind;
use crate::prelude::Arc;
use async_trait::async_trait;
use std::time::Duration;

/// Request policy handed to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Enforced by [`request_position`] regardless of the provider
    pub timeout: Duration,
    /// Oldest cached fix the provider may return; zero forces a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::from(&GeolocationConfig::default())
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            enable_high_accuracy: config.enable_high_accuracy,
            timeout: Duration::from_millis(config.timeout_ms),
            maximum_age: Duration::from_millis(config.maximum_age_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coords: LatLng,
    /// Radius of uncertainty in meters
    pub accuracy_m: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this host")]
    Unsupported,

    #[error("permission to read the position was denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("position request timed out")]
    Timeout,

    #[error("geolocation failed: {0}")]
    Other(String),
}

impl GeolocationError {
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            GeolocationError::Unsupported => NoticeKind::GeolocationUnsupported,
            GeolocationError::PermissionDenied => NoticeKind::PermissionDenied,
            GeolocationError::PositionUnavailable => NoticeKind::PositionUnavailable,
            GeolocationError::Timeout => NoticeKind::Timeout,
            GeolocationError::Other(_) => NoticeKind::GeolocationFailed,
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> &'static str {
        self.notice_kind().message()
    }
}

pub type PositionResult = std::result::Result<Position, GeolocationError>;

/// Host position API.
///
/// The crate ships no platform backend. [`provider_from_config`] yields
/// [`FixedPosition`] when `geolocation.fixed_position` is configured and
/// [`Unsupported`] otherwise, so "Locate me" reports
/// [`GeolocationError::Unsupported`] until an embedder injects a real
/// provider through `MapBuilder::with_geolocation`.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> PositionResult;
}

/// Asks `provider` for a position, failing with `Timeout` once
/// `options.timeout` has elapsed
pub async fn request_position(
    provider: &dyn GeolocationProvider,
    options: &PositionOptions,
) -> PositionResult {
    let position = tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .map_err(|_| GeolocationError::Timeout)??;

    if !position.coords.is_valid() || !position.accuracy_m.is_finite() {
        return Err(GeolocationError::Other(format!(
            "provider returned an invalid position: {:?}",
            position
        )));
    }
    Ok(position)
}

/// Reports a configured position, optionally after a delay
#[derive(Debug, Clone)]
pub struct FixedPosition {
    position: Position,
    delay: Option<Duration>,
}

impl FixedPosition {
    pub fn new(coords: LatLng, accuracy_m: f64) -> Self {
        Self {
            position: Position { coords, accuracy_m },
            delay: None,
        }
    }

    /// Waits `delay` before answering, like a real receiver would
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self, _options: &PositionOptions) -> PositionResult {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.position)
    }
}

/// Host without any position source
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl GeolocationProvider for Unsupported {
    async fn current_position(&self, _options: &PositionOptions) -> PositionResult {
        Err(GeolocationError::Unsupported)
    }
}

/// Provider described by the configuration: a fixed position when one is
/// configured, otherwise [`Unsupported`]
pub fn provider_from_config(config: &GeolocationConfig) -> Arc<dyn GeolocationProvider> {
    match &config.fixed_position {
        Some(fixed) => Arc::new(FixedPosition::new(
            LatLng::new(fixed.lat, fixed.lng),
            fixed.accuracy_m,
        )),
        None => Arc::new(Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FixedPositionConfig;

    struct Denied;

    #[async_trait]
    impl GeolocationProvider for Denied {
        async fn current_position(&self, _options: &PositionOptions) -> PositionResult {
            Err(GeolocationError::PermissionDenied)
        }
    }

    #[test]
    fn test_default_policy() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(GeolocationError::Unsupported.message(), "Geolocation not supported");
        assert_eq!(
            GeolocationError::PositionUnavailable.message(),
            "Location unavailable."
        );
        assert_eq!(
            GeolocationError::Other("gps off".into()).message(),
            "Unable to retrieve location."
        );
    }

    #[tokio::test]
    async fn test_fixed_position() {
        let provider = FixedPosition::new(LatLng::new(28.6, 77.2), 15.0);
        let position = request_position(&provider, &PositionOptions::default()).await.unwrap();
        assert_eq!(position.coords, LatLng::new(28.6, 77.2));
        assert_eq!(position.accuracy_m, 15.0);
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let provider = FixedPosition::new(LatLng::new(28.6, 77.2), 15.0)
            .with_delay(Duration::from_secs(5));
        let options = PositionOptions {
            timeout: Duration::from_millis(20),
            ..PositionOptions::default()
        };
        assert_eq!(
            request_position(&provider, &options).await,
            Err(GeolocationError::Timeout)
        );
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through() {
        let options = PositionOptions::default();
        assert_eq!(
            request_position(&Denied, &options).await,
            Err(GeolocationError::PermissionDenied)
        );
        assert_eq!(
            request_position(&Unsupported, &options).await,
            Err(GeolocationError::Unsupported)
        );
    }

    #[tokio::test]
    async fn test_invalid_position_rejected() {
        let provider = FixedPosition::new(LatLng::new(128.0, 77.2), 15.0);
        assert!(matches!(
            request_position(&provider, &PositionOptions::default()).await,
            Err(GeolocationError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_from_config() {
        let options = PositionOptions::default();

        let none = provider_from_config(&GeolocationConfig::default());
        assert_eq!(
            request_position(none.as_ref(), &options).await,
            Err(GeolocationError::Unsupported)
        );

        let config = GeolocationConfig {
            fixed_position: Some(FixedPositionConfig {
                lat: 19.076,
                lng: 72.8777,
                accuracy_m: 40.0,
            }),
            ..GeolocationConfig::default()
        };
        let fixed = provider_from_config(&config);
        let position = request_position(fixed.as_ref(), &options).await.unwrap();
        assert_eq!(position.coords, LatLng::new(19.076, 72.8777));
    }
}
