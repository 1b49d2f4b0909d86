use serde::Deserialize;

use civicpulse_common::error::FieldError;
use civicpulse_common::{CivicError, Result};

const MIN_TITLE_CHARS: usize = 3;

/// Raw submission payload. Every field is optional at the wire level so the
/// validator can report missing fields individually instead of the
/// deserializer rejecting the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssuePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A payload that passed validation.
#[derive(Debug, Clone)]
pub struct ValidIssue {
    pub title: String,
    pub description: String,
    pub category: String,
    pub longitude: f64,
    pub latitude: f64,
    pub images: Vec<String>,
}

/// Schema check for a new submission. Collects every field failure before
/// reporting, and runs before any external call or write.
pub fn validate(payload: NewIssuePayload) -> Result<ValidIssue> {
    let mut errors = Vec::new();

    let title = payload.title.unwrap_or_default();
    if title.chars().count() < MIN_TITLE_CHARS {
        errors.push(FieldError::new(
            "title",
            format!("required, at least {MIN_TITLE_CHARS} characters"),
        ));
    }

    let category = payload.category.unwrap_or_default();
    if category.trim().is_empty() {
        errors.push(FieldError::new("category", "required"));
    }

    let latitude = payload.latitude;
    let longitude = payload.longitude;
    match latitude {
        None => errors.push(FieldError::new("latitude", "required number")),
        Some(lat) if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) => {
            errors.push(FieldError::new("latitude", "must be within [-90, 90]"));
        }
        Some(_) => {}
    }
    match longitude {
        None => errors.push(FieldError::new("longitude", "required number")),
        Some(lon) if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) => {
            errors.push(FieldError::new("longitude", "must be within [-180, 180]"));
        }
        Some(_) => {}
    }

    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) if errors.is_empty() => Ok(ValidIssue {
            title,
            description: payload.description.unwrap_or_default(),
            category,
            longitude,
            latitude,
            images: payload.images,
        }),
        _ => Err(CivicError::Validation(errors)),
    }
}

/// Raw edit payload. Edits overwrite title, description and category; the
/// same field rules as submission apply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditIssuePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidEdit {
    pub title: String,
    pub description: String,
    pub category: String,
}

pub fn validate_edit(payload: EditIssuePayload) -> Result<ValidEdit> {
    let mut errors = Vec::new();

    let title = payload.title.unwrap_or_default();
    if title.chars().count() < MIN_TITLE_CHARS {
        errors.push(FieldError::new(
            "title",
            format!("required, at least {MIN_TITLE_CHARS} characters"),
        ));
    }

    let category = payload.category.unwrap_or_default();
    if category.trim().is_empty() {
        errors.push(FieldError::new("category", "required"));
    }

    if !errors.is_empty() {
        return Err(CivicError::Validation(errors));
    }

    Ok(ValidEdit {
        title,
        description: payload.description.unwrap_or_default(),
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> NewIssuePayload {
        NewIssuePayload {
            title: Some("Pothole on Main St".to_string()),
            description: None,
            category: Some("Road".to_string()),
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
            images: vec![],
        }
    }

    #[test]
    fn accepts_valid_payload() {
        let valid = validate(valid_payload()).unwrap();
        assert_eq!(valid.title, "Pothole on Main St");
        assert_eq!(valid.description, "");
        assert_eq!((valid.longitude, valid.latitude), (-74.0060, 40.7128));
    }

    #[test]
    fn rejects_short_title() {
        let payload = NewIssuePayload {
            title: Some("ab".to_string()),
            ..valid_payload()
        };
        let Err(CivicError::Validation(errors)) = validate(payload) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn rejects_missing_title() {
        let payload = NewIssuePayload {
            title: None,
            ..valid_payload()
        };
        assert!(matches!(
            validate(payload),
            Err(CivicError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_category() {
        let payload = NewIssuePayload {
            category: Some("   ".to_string()),
            ..valid_payload()
        };
        let Err(CivicError::Validation(errors)) = validate(payload) else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "category");
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        let payload = NewIssuePayload {
            latitude: Some(91.0),
            longitude: Some(-200.0),
            ..valid_payload()
        };
        let Err(CivicError::Validation(errors)) = validate(payload) else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["latitude", "longitude"]);
    }

    #[test]
    fn collects_all_failures_at_once() {
        let Err(CivicError::Validation(errors)) = validate(NewIssuePayload::default()) else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "category", "latitude", "longitude"]);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let payload = NewIssuePayload {
            title: Some("火災報".to_string()),
            ..valid_payload()
        };
        assert!(validate(payload).is_ok());
    }

    #[test]
    fn edit_applies_same_field_rules() {
        let edit = validate_edit(EditIssuePayload {
            title: Some("Updated title".to_string()),
            description: None,
            category: Some("Lighting".to_string()),
        })
        .unwrap();
        assert_eq!(edit.description, "");

        assert!(matches!(
            validate_edit(EditIssuePayload {
                title: Some("ab".to_string()),
                description: None,
                category: Some("Road".to_string()),
            }),
            Err(CivicError::Validation(_))
        ));
    }
}
