//! OpenCage forward-geocoding client.
//!
//! One lookup per resolution, `limit=1`, no retry and no caching. The
//! public OpenCage API enforces a rate limit of roughly 1 request per
//! second on free keys; the interactive create path stays well under it,
//! and batch tooling is expected to pace itself.
//!
//! See <https://opencagedata.com/api#forward>

use sisocc_types::Coordinates;

use crate::GeocodeError;

/// Geocodes a single free-form query against the OpenCage forward endpoint.
///
/// Returns `Ok(None)` when the provider has no candidate for the query.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the provider
/// answers with a non-2xx status, or the response body cannot be parsed.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Option<Coordinates>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[("q", query), ("key", api_key), ("limit", "1")])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(GeocodeError::Status {
            status: status.as_u16(),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses an OpenCage forward-geocoding JSON response.
///
/// The first candidate wins; its `geometry.lat`/`geometry.lng` become the
/// resolved pair. An empty `results` array is `Ok(None)`.
pub fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let results = body
        .get("results")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "OpenCage response has no results array".to_string(),
        })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let geometry = first.get("geometry").ok_or_else(|| GeocodeError::Parse {
        message: "OpenCage candidate has no geometry".to_string(),
    })?;

    let latitude = geometry
        .get("lat")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in OpenCage geometry".to_string(),
        })?;

    let longitude = geometry
        .get("lng")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lng in OpenCage geometry".to_string(),
        })?;

    Ok(Some(Coordinates {
        latitude,
        longitude,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_first_candidate() {
        let body = serde_json::json!({
            "results": [
                {
                    "formatted": "Rua X, Recife, Pernambuco, Brasil",
                    "geometry": { "lat": -8.05, "lng": -34.90 }
                },
                {
                    "formatted": "Rua X, Olinda, Pernambuco, Brasil",
                    "geometry": { "lat": -7.99, "lng": -34.84 }
                }
            ],
            "total_results": 2
        });

        let coords = parse_response(&body).unwrap().unwrap();
        assert!((coords.latitude - (-8.05)).abs() < f64::EPSILON);
        assert!((coords.longitude - (-34.90)).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_results_is_none() {
        let body = serde_json::json!({ "results": [], "total_results": 0 });
        assert_eq!(parse_response(&body).unwrap(), None);
    }

    #[test]
    fn missing_results_is_parse_error() {
        let body = serde_json::json!({ "status": { "code": 200 } });
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[test]
    fn missing_geometry_component_is_parse_error() {
        let body = serde_json::json!({
            "results": [ { "geometry": { "lat": -8.05 } } ]
        });
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }
}
