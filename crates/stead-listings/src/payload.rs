//! Shared extraction and normalization of property payloads.
//!
//! Create and update both run a request body through [`extract_fields`];
//! the `partial` flag decides whether absent fields are an error or simply
//! left out of the result. Callers map a [`PayloadError`] to a 400 response
//! and never write.

use serde_json::{Map, Value};
use thiserror::Error;

/// The text columns that must be non-empty when supplied.
const TEXT_FIELDS: [&str; 4] = ["name", "description", "property_type", "city"];

/// Validation errors produced while extracting a property payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("{0} must be a string")]
    NotAString(&'static str),
    #[error("rooms_details must be a list")]
    RoomsDetailsNotList,
    #[error("rooms_count must be an integer")]
    RoomsCountNotInteger,
}

/// A normalized property field mapping.
///
/// `None` means the field was absent from a partial payload; extraction in
/// full mode fills every field. `rooms_details` holds the serialized JSON
/// array ready for the TEXT column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub rooms_count: Option<i64>,
    pub rooms_details: Option<String>,
}

impl PropertyFields {
    /// True when the payload supplied nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.property_type.is_none()
            && self.city.is_none()
            && self.rooms_count.is_none()
            && self.rooms_details.is_none()
    }
}

/// Validates and normalizes a property payload.
///
/// Text fields are trimmed and must be non-empty when present (required when
/// `partial` is false). `rooms_details` collapses null/`""` to an empty list
/// and must otherwise be a JSON array. `rooms_count` accepts a JSON integer
/// or a numeric string, clamped to a minimum of 0; when omitted it defaults
/// to the length of the supplied (or defaulted) details.
pub fn extract_fields(
    payload: &Map<String, Value>,
    partial: bool,
) -> Result<PropertyFields, PayloadError> {
    let mut texts: [Option<String>; 4] = Default::default();
    for (slot, field) in texts.iter_mut().zip(TEXT_FIELDS) {
        match payload.get(field) {
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(PayloadError::EmptyField(field));
                }
                *slot = Some(trimmed.to_string());
            }
            Some(Value::Null) => return Err(PayloadError::EmptyField(field)),
            Some(_) => return Err(PayloadError::NotAString(field)),
            None if !partial => return Err(PayloadError::MissingField(field)),
            None => {}
        }
    }
    let [name, description, property_type, city] = texts;
    let mut fields = PropertyFields {
        name,
        description,
        property_type,
        city,
        ..PropertyFields::default()
    };

    let details = match payload.get("rooms_details") {
        Some(Value::Null) => Some(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => Some(Vec::new()),
        Some(Value::Array(list)) => Some(list.clone()),
        Some(_) => return Err(PayloadError::RoomsDetailsNotList),
        None if !partial => Some(Vec::new()),
        None => None,
    };
    if let Some(list) = &details {
        // Vec<Value> always serializes.
        fields.rooms_details = serde_json::to_string(list).ok();
    }

    let details_supplied = payload.contains_key("rooms_details");
    match payload.get("rooms_count") {
        Some(value) => {
            let count = parse_rooms_count(value)?;
            fields.rooms_count = Some(count.max(0));
        }
        None if details_supplied => {
            fields.rooms_count = details.as_ref().map(|list| list.len() as i64);
        }
        None if !partial => {
            fields.rooms_count = Some(details.as_ref().map_or(0, |list| list.len() as i64));
        }
        None => {}
    }

    Ok(fields)
}

fn parse_rooms_count(value: &Value) -> Result<i64, PayloadError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or(PayloadError::RoomsCountNotInteger),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| PayloadError::RoomsCountNotInteger),
        _ => Err(PayloadError::RoomsCountNotInteger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().expect("test payload must be an object").clone()
    }

    fn full_payload() -> Map<String, Value> {
        map(json!({
            "name": "Cozy Apartment",
            "description": "Two bedrooms near the river",
            "property_type": "apartment",
            "city": "Paris",
        }))
    }

    #[test]
    fn full_mode_requires_every_text_field() {
        let mut payload = full_payload();
        payload.remove("description");

        let err = extract_fields(&payload, false).expect_err("missing field should fail");
        assert_eq!(err, PayloadError::MissingField("description"));
        assert_eq!(err.to_string(), "description is required");
    }

    #[test]
    fn blank_text_field_is_rejected_even_in_partial_mode() {
        let payload = map(json!({"city": "   "}));

        let err = extract_fields(&payload, true).expect_err("blank city should fail");
        assert_eq!(err, PayloadError::EmptyField("city"));
        assert_eq!(err.to_string(), "city cannot be empty");
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut payload = full_payload();
        payload.insert("name".to_string(), json!("  Cozy Apartment  "));

        let fields = extract_fields(&payload, false).expect("extract should succeed");
        assert_eq!(fields.name.as_deref(), Some("Cozy Apartment"));
    }

    #[test]
    fn full_mode_defaults_rooms_to_empty() {
        let fields = extract_fields(&full_payload(), false).expect("extract should succeed");
        assert_eq!(fields.rooms_details.as_deref(), Some("[]"));
        assert_eq!(fields.rooms_count, Some(0));
    }

    #[test]
    fn rooms_count_defaults_to_details_length() {
        let mut payload = full_payload();
        payload.insert(
            "rooms_details".to_string(),
            json!([{"type": "bedroom", "size": 15}, {"type": "kitchen", "size": 9}]),
        );

        let fields = extract_fields(&payload, false).expect("extract should succeed");
        assert_eq!(fields.rooms_count, Some(2));
    }

    #[test]
    fn null_rooms_details_collapses_to_empty_list() {
        let payload = map(json!({"rooms_details": null}));

        let fields = extract_fields(&payload, true).expect("extract should succeed");
        assert_eq!(fields.rooms_details.as_deref(), Some("[]"));
        assert_eq!(fields.rooms_count, Some(0));
    }

    #[test]
    fn non_list_rooms_details_is_rejected() {
        let payload = map(json!({"rooms_details": {"type": "bedroom"}}));

        let err = extract_fields(&payload, true).expect_err("object should fail");
        assert_eq!(err, PayloadError::RoomsDetailsNotList);
    }

    #[test]
    fn rooms_count_accepts_numeric_strings_and_clamps() {
        let payload = map(json!({"rooms_count": "3"}));
        let fields = extract_fields(&payload, true).expect("extract should succeed");
        assert_eq!(fields.rooms_count, Some(3));

        let payload = map(json!({"rooms_count": -4}));
        let fields = extract_fields(&payload, true).expect("extract should succeed");
        assert_eq!(fields.rooms_count, Some(0));
    }

    #[test]
    fn non_integer_rooms_count_is_rejected() {
        for bad in [json!("three"), json!(2.5), json!([1])] {
            let payload = map(json!({"rooms_count": bad}));
            let err = extract_fields(&payload, true).expect_err("should fail");
            assert_eq!(err, PayloadError::RoomsCountNotInteger);
        }
    }

    #[test]
    fn partial_mode_with_nothing_supplied_is_empty() {
        let payload = map(json!({}));

        let fields = extract_fields(&payload, true).expect("extract should succeed");
        assert!(fields.is_empty());
    }
}
