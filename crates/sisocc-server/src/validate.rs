//! Request validation boundary.
//!
//! Multipart form fields arrive as text; this module collects them into a
//! typed form, validates it, and converts it into the lifecycle input.
//! Everything numeric or enumerated is parsed here so nothing stringly
//! typed crosses into `sisocc-core`.

use serde::de::DeserializeOwned;
use sisocc_types::{
    Coordinates, NewOccurrence, OccurrenceChanges, OccurrenceStatus, OccurrenceType, Priority,
    UserId,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// Text fields of the occurrence creation form.
///
/// Photos are handled separately by the upload module; this struct only
/// carries the scalar fields.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateOccurrenceForm {
    /// Incident category, as its wire string (e.g. `FLOODING`).
    #[validate(length(min = 1, message = "occurrence_type is required"))]
    pub occurrence_type: String,
    /// Short place label.
    #[validate(length(min = 1, message = "place is required"))]
    pub place: String,
    /// Full address text.
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    /// Latitude as decimal text, when supplied by the reporter.
    pub latitude: Option<String>,
    /// Longitude as decimal text, when supplied by the reporter.
    pub longitude: Option<String>,
    /// Initial status wire string.
    pub status: Option<String>,
    /// Priority wire string.
    pub priority: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Assignee UUID text.
    pub assignee: Option<String>,
}

impl CreateOccurrenceForm {
    /// Record one text field from the multipart stream.
    ///
    /// Returns `false` for field names the form does not know; the
    /// caller decides whether to ignore or reject them.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "occurrence_type" => self.occurrence_type = value,
            "place" => self.place = value,
            "address" => self.address = value,
            "latitude" => self.latitude = Some(value),
            "longitude" => self.longitude = Some(value),
            "status" => self.status = Some(value),
            "priority" => self.priority = Some(value),
            "description" => self.description = Some(value),
            "assignee" => self.assignee = Some(value),
            _ => return false,
        }
        true
    }

    /// Validate and convert the form into the lifecycle input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when a required field is missing,
    /// a numeric field does not parse, a coordinate is out of range, or an
    /// enumerated field carries an unknown value.
    pub fn into_new_occurrence(
        self,
        created_by: UserId,
        photos: Vec<String>,
    ) -> Result<NewOccurrence, ApiError> {
        self.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let latitude = self
            .latitude
            .as_deref()
            .map(|v| parse_coordinate("latitude", v))
            .transpose()?;
        let longitude = self
            .longitude
            .as_deref()
            .map(|v| parse_coordinate("longitude", v))
            .transpose()?;

        if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
            let coordinates = Coordinates {
                latitude,
                longitude,
            };
            if !coordinates.is_valid() {
                return Err(ApiError::Validation(format!(
                    "coordinates out of range: {latitude}, {longitude}"
                )));
            }
        }

        let occurrence_type: OccurrenceType =
            parse_wire_enum("occurrence_type", &self.occurrence_type)?;
        let status: Option<OccurrenceStatus> = self
            .status
            .as_deref()
            .map(|v| parse_wire_enum("status", v))
            .transpose()?;
        let priority: Option<Priority> = self
            .priority
            .as_deref()
            .map(|v| parse_wire_enum("priority", v))
            .transpose()?;

        let assignee = self
            .assignee
            .as_deref()
            .map(|v| {
                Uuid::parse_str(v)
                    .map(UserId::from)
                    .map_err(|_| ApiError::Validation(format!("assignee is not a UUID: {v:?}")))
            })
            .transpose()?;

        Ok(NewOccurrence {
            occurrence_type,
            place: self.place,
            address: self.address,
            latitude,
            longitude,
            status,
            priority,
            description: self.description.filter(|d| !d.trim().is_empty()),
            created_by,
            assignee,
            photos,
        })
    }
}

/// Check a JSON partial-update body before it reaches the lifecycle.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the change set is empty.
pub fn check_changes(changes: &OccurrenceChanges) -> Result<(), ApiError> {
    if changes.is_empty() {
        return Err(ApiError::Validation(String::from(
            "update body contains no changes",
        )));
    }
    Ok(())
}

/// Parse one coordinate component from decimal text.
fn parse_coordinate(field: &str, value: &str) -> Result<f64, ApiError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::Validation(format!("{field} is not a number: {value:?}")))
}

/// Parse an enumerated field from its wire string via serde.
///
/// Keeps the accepted values in lockstep with the JSON API without a
/// second hand-written mapping.
fn parse_wire_enum<T: DeserializeOwned>(field: &str, value: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.to_owned()))
        .map_err(|_| ApiError::Validation(format!("unknown {field}: {value:?}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn filled_form() -> CreateOccurrenceForm {
        CreateOccurrenceForm {
            occurrence_type: String::from("FLOODING"),
            place: String::from("Ponte do Limoeiro"),
            address: String::from("Av. Militar, Recife"),
            ..CreateOccurrenceForm::default()
        }
    }

    #[test]
    fn known_fields_are_recorded() {
        let mut form = CreateOccurrenceForm::default();
        assert!(form.set_field("place", String::from("Derby")));
        assert!(form.set_field("latitude", String::from("-8.05")));
        assert!(!form.set_field("severity", String::from("high")));
        assert_eq!(form.place, "Derby");
        assert_eq!(form.latitude.as_deref(), Some("-8.05"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut form = filled_form();
        form.place = String::new();
        let err = form
            .into_new_occurrence(UserId::new(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn string_coordinates_are_parsed() {
        let mut form = filled_form();
        form.latitude = Some(String::from("-8.0476"));
        form.longitude = Some(String::from("-34.8770"));
        let input = form.into_new_occurrence(UserId::new(), Vec::new()).unwrap();
        assert_eq!(input.latitude, Some(-8.0476));
        assert_eq!(input.longitude, Some(-34.8770));
    }

    #[test]
    fn non_numeric_coordinate_is_rejected() {
        let mut form = filled_form();
        form.latitude = Some(String::from("eight south"));
        form.longitude = Some(String::from("-34.8770"));
        let err = form
            .into_new_occurrence(UserId::new(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut form = filled_form();
        form.latitude = Some(String::from("-95.0"));
        form.longitude = Some(String::from("-34.8770"));
        let err = form
            .into_new_occurrence(UserId::new(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let mut form = filled_form();
        form.status = Some(String::from("ARCHIVED"));
        let err = form
            .into_new_occurrence(UserId::new(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn wire_enums_parse_to_typed_values() {
        let mut form = filled_form();
        form.status = Some(String::from("UNDER_REVIEW"));
        form.priority = Some(String::from("CRITICAL"));
        let input = form.into_new_occurrence(UserId::new(), Vec::new()).unwrap();
        assert_eq!(input.occurrence_type, OccurrenceType::Flooding);
        assert_eq!(input.status, Some(OccurrenceStatus::UnderReview));
        assert_eq!(input.priority, Some(Priority::Critical));
    }

    #[test]
    fn empty_change_set_is_rejected() {
        let err = check_changes(&OccurrenceChanges::default()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let changes = OccurrenceChanges {
            priority: Some(Priority::Low),
            ..OccurrenceChanges::default()
        };
        assert!(check_changes(&changes).is_ok());
    }
}
