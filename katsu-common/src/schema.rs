//! Extension schemas for free-form `extra_properties` fields
//!
//! Clinical records carry an optional `extra_properties` JSON object for
//! site-specific data. Deployments may attach a JSON schema (Draft 7) per
//! record kind; ingestion validates incoming objects against it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Message used for every schema validation failure, so callers can match on
/// it without parsing validator output.
pub const SCHEMA_VALIDATION_MESSAGE: &str = "Not valid JSON schema for this field.";

/// Record kinds that accept an `extra_properties` object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Donor,
    Specimen,
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaType::Donor => write!(f, "donor"),
            SchemaType::Specimen => write!(f, "specimen"),
        }
    }
}

/// One configured extension schema entry
///
/// `json_schema` is an arbitrary JSON-schema document. `required` marks
/// whether records of `schema_type` must carry `extra_properties` at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionSchema {
    pub json_schema: serde_json::Value,
    pub required: bool,
    pub schema_type: SchemaType,
}

impl ExtensionSchema {
    /// Validate a record's `extra_properties` against this entry.
    ///
    /// A missing object is an error only when the schema is `required`.
    pub fn check_extra_properties(&self, extra: Option<&serde_json::Value>) -> Result<()> {
        match extra {
            Some(value) => validate_against_schema(value, &self.json_schema),
            None if self.required => Err(Error::Validation(format!(
                "extra_properties is required for {} records",
                self.schema_type
            ))),
            None => Ok(()),
        }
    }
}

/// Find the configured schema for a record kind, if any
pub fn schema_for<'a>(
    schemas: &'a [ExtensionSchema],
    schema_type: SchemaType,
) -> Option<&'a ExtensionSchema> {
    schemas.iter().find(|s| s.schema_type == schema_type)
}

/// Check a JSON document against a JSON-schema document (Draft 7).
///
/// Thin adapter over the `jsonschema` crate: a schema that does not compile
/// is a configuration error; a document that does not validate yields
/// [`SCHEMA_VALIDATION_MESSAGE`].
pub fn validate_against_schema(data: &serde_json::Value, schema: &serde_json::Value) -> Result<()> {
    let compiled = jsonschema::JSONSchema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .compile(schema)
        .map_err(|e| Error::Config(format!("invalid JSON schema: {}", e)))?;

    if !compiled.is_valid(data) {
        return Err(Error::Validation(SCHEMA_VALIDATION_MESSAGE.to_string()));
    }
    Ok(())
}

/// Assert a JSON document matches a schema, handing the document back.
///
/// Test helper: returns the data unchanged when valid so assertions can be
/// chained; fails with the validation error otherwise.
pub fn assert_valid_schema<'a>(
    data: &'a serde_json::Value,
    schema: &serde_json::Value,
) -> Result<&'a serde_json::Value> {
    validate_against_schema(data, schema)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn age_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "age_group": { "type": "string" },
                "consented": { "type": "boolean" }
            },
            "required": ["age_group"]
        })
    }

    #[test]
    fn test_valid_data_is_returned_unchanged() {
        let data = json!({ "age_group": "50-59", "consented": true });
        let schema = age_schema();

        let result = assert_valid_schema(&data, &schema).expect("data should validate");
        assert_eq!(result, &data);
    }

    #[test]
    fn test_invalid_data_is_rejected() {
        // age_group is required and must be a string
        let data = json!({ "age_group": 42 });
        let schema = age_schema();

        let err = assert_valid_schema(&data, &schema).unwrap_err();
        assert_eq!(err.to_string(), SCHEMA_VALIDATION_MESSAGE);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let data = json!({ "consented": false });
        let schema = age_schema();

        assert!(validate_against_schema(&data, &schema).is_err());
    }

    #[test]
    fn test_required_extension_rejects_missing_object() {
        let entry = ExtensionSchema {
            json_schema: age_schema(),
            required: true,
            schema_type: SchemaType::Donor,
        };

        assert!(entry.check_extra_properties(None).is_err());
        assert!(entry
            .check_extra_properties(Some(&json!({ "age_group": "0-19" })))
            .is_ok());
    }

    #[test]
    fn test_optional_extension_accepts_missing_object() {
        let entry = ExtensionSchema {
            json_schema: age_schema(),
            required: false,
            schema_type: SchemaType::Specimen,
        };

        assert!(entry.check_extra_properties(None).is_ok());
    }

    #[test]
    fn test_schema_for_picks_matching_kind() {
        let schemas = vec![
            ExtensionSchema {
                json_schema: json!({}),
                required: false,
                schema_type: SchemaType::Specimen,
            },
            ExtensionSchema {
                json_schema: json!({}),
                required: true,
                schema_type: SchemaType::Donor,
            },
        ];

        let found = schema_for(&schemas, SchemaType::Donor).expect("donor schema configured");
        assert!(found.required);
        assert!(schema_for(&[], SchemaType::Donor).is_none());
    }
}
