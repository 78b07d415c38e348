//! Address-to-coordinate resolution for the SISOCC occurrence service.
//!
//! Wraps the OpenCage forward-geocoding API behind a small [`Geocoder`]
//! facade. Every lookup is biased toward the service's home municipality by
//! appending a fixed locality suffix to the query, and asks the provider
//! for at most one candidate.
//!
//! Resolution failure (no candidate, transport error, missing credential,
//! non-2xx status) is handled by a single system-wide [`GeocodePolicy`]:
//!
//! - [`GeocodePolicy::Strict`] propagates the failure so the caller must
//!   supply coordinates manually.
//! - [`GeocodePolicy::Fallback`] logs a warning and substitutes the
//!   municipal reference point.
//!
//! The policy is chosen once in configuration and applied uniformly; call
//! sites never mix the two behaviors.

pub mod opencage;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sisocc_types::Coordinates;
use tracing::warn;

/// Default OpenCage forward-geocoding endpoint.
pub const DEFAULT_API_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

/// Locality suffix appended to every query to bias results toward the
/// service's home municipality.
pub const LOCALITY_SUFFIX: &str = ", Recife, Pernambuco, Brasil";

/// The municipal reference point (Recife city center), used as the
/// substitute pair under [`GeocodePolicy::Fallback`].
pub const REFERENCE_POINT: Coordinates = Coordinates {
    latitude: -8.0476,
    longitude: -34.8770,
};

/// Default bound on how long one lookup may take.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur while resolving an address.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// No API credential is configured; detected before any network call.
    #[error("geocoding API key is not configured")]
    MissingApiKey,

    /// The HTTP request failed (transport error or timeout).
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("geocoding provider returned status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The provider returned zero candidates for the query.
    #[error("no coordinates found for the address")]
    NoMatch,

    /// The response body did not have the expected shape.
    #[error("geocoding response parse failed: {message}")]
    Parse {
        /// What was missing or malformed.
        message: String,
    },
}

/// What to do when address resolution fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodePolicy {
    /// Propagate the failure; the caller must supply coordinates manually.
    Strict,
    /// Substitute the municipal reference point and log a warning.
    #[default]
    Fallback,
}

/// Configuration for the geocoding resolver.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Forward-geocoding endpoint URL.
    pub api_url: String,
    /// Provider API credential; `None` means unconfigured.
    pub api_key: Option<String>,
    /// Failure policy applied to every resolution.
    pub policy: GeocodePolicy,
    /// Bound on how long one lookup may take.
    pub timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            policy: GeocodePolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Resolves free-text addresses to coordinate pairs.
///
/// Cheap to clone; the underlying [`reqwest::Client`] is a shared handle.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    config: GeocodeConfig,
}

impl Geocoder {
    /// Create a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// The configured failure policy.
    pub const fn policy(&self) -> GeocodePolicy {
        self.config.policy
    }

    /// Resolve an address to a coordinate pair, applying the configured
    /// failure policy.
    ///
    /// The locality suffix is appended before querying so results stay
    /// inside the home municipality.
    ///
    /// # Errors
    ///
    /// Under [`GeocodePolicy::Strict`], returns the underlying
    /// [`GeocodeError`]. Under [`GeocodePolicy::Fallback`] this method
    /// never fails: the error is logged and [`REFERENCE_POINT`] is
    /// returned instead.
    pub async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        match self.lookup(address).await {
            Ok(coords) => Ok(coords),
            Err(error) => apply_policy(error, self.config.policy, address),
        }
    }

    /// One provider lookup without policy handling.
    async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GeocodeError::MissingApiKey);
        };

        let query = format!("{address}{LOCALITY_SUFFIX}");
        let found =
            opencage::geocode_freeform(&self.client, &self.config.api_url, api_key, &query)
                .await?;

        found.ok_or(GeocodeError::NoMatch)
    }
}

/// Apply the failure policy to a resolution error.
///
/// Strict propagates; fallback logs and substitutes [`REFERENCE_POINT`].
fn apply_policy(
    error: GeocodeError,
    policy: GeocodePolicy,
    address: &str,
) -> Result<Coordinates, GeocodeError> {
    match policy {
        GeocodePolicy::Strict => Err(error),
        GeocodePolicy::Fallback => {
            warn!(
                %error,
                address,
                "geocoding failed, substituting municipal reference point"
            );
            Ok(REFERENCE_POINT)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn strict_policy_propagates_failure() {
        let result = apply_policy(GeocodeError::NoMatch, GeocodePolicy::Strict, "Rua X");
        assert!(matches!(result, Err(GeocodeError::NoMatch)));
    }

    #[test]
    fn fallback_policy_substitutes_reference_point() {
        let coords =
            apply_policy(GeocodeError::NoMatch, GeocodePolicy::Fallback, "Rua X").unwrap();
        assert_eq!(coords, REFERENCE_POINT);
    }

    #[test]
    fn fallback_covers_missing_credential_too() {
        let coords = apply_policy(
            GeocodeError::MissingApiKey,
            GeocodePolicy::Fallback,
            "Rua X",
        )
        .unwrap();
        assert_eq!(coords, REFERENCE_POINT);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_network_call() {
        // Strict policy + no key: the resolver must fail without touching
        // the network (the configured URL is unroutable on purpose).
        let geocoder = Geocoder::new(GeocodeConfig {
            api_url: String::from("http://invalid.local/geocode"),
            api_key: None,
            policy: GeocodePolicy::Strict,
            timeout: Duration::from_millis(50),
        })
        .unwrap();

        let err = geocoder.resolve("Rua X").await.unwrap_err();
        assert!(matches!(err, GeocodeError::MissingApiKey));
    }

    #[test]
    fn default_config_points_at_opencage() {
        let config = GeocodeConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.policy, GeocodePolicy::Fallback);
    }

    #[test]
    fn reference_point_is_inside_the_municipality() {
        assert!(REFERENCE_POINT.is_valid());
        assert!((-8.2..=-7.9).contains(&REFERENCE_POINT.latitude));
        assert!((-35.1..=-34.8).contains(&REFERENCE_POINT.longitude));
    }
}
