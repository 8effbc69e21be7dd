//! Error types for the strata library.
//!
//! This module provides the error hierarchy for configuration resolution,
//! using `thiserror` for ergonomic error handling. Every error can be
//! reported uniformly through [`Error::code`] and [`Error::to_details`].

use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for operations that may fail with a strata error.
///
/// # Examples
///
/// ```
/// use strata::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the strata library.
///
/// The first four variants form the external taxonomy of the resolution
/// engine; the remaining variants wrap infrastructure failures from the
/// backing stores.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested provider kind is not part of the configured set.
    #[error("unable to find config provider: {provider}")]
    ProviderNotFound {
        /// The provider kind that was requested.
        provider: String,
    },

    /// A stored document could not be decoded, or a schema failed to compile.
    #[error("failed to parse configuration for paths {paths:?}: {reason}")]
    Parse {
        /// The group path that was being resolved.
        paths: Vec<String>,
        /// The root cause message.
        reason: String,
    },

    /// A template failed to render or a value failed type coercion.
    #[error("invalid value at {location}: {reason}")]
    Value {
        /// Dotted location path of the offending entry.
        location: String,
        /// The offending raw value.
        value: Value,
        /// The root cause message.
        reason: String,
    },

    /// An evaluated document failed validation against its schema.
    #[error("failed to validate config against schema {schema}: {reason}")]
    Validation {
        /// Name of the schema the document was validated against.
        schema: String,
        /// Slash-joined path of the failing schema fragment.
        schema_path: String,
        /// The validation failure message.
        reason: String,
        /// The offending schema fragment.
        fragment: Value,
    },

    /// A database error occurred in a SQLite-backed store.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A YAML serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine settings are invalid.
    #[error("invalid settings: {reason}")]
    Settings {
        /// A description of the settings problem.
        reason: String,
    },
}

impl Error {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProviderNotFound { .. } => "CONFIG_PROVIDER_NOT_FOUND",
            Self::Parse { .. } => "CONFIG_PARSE_ERROR",
            Self::Value { .. } => "CONFIG_VALUE_ERROR",
            Self::Validation { .. } => "CONFIG_VALIDATION_ERROR",
            Self::Settings { .. } => "CONFIG_SETTINGS_ERROR",
            Self::Database(_) | Self::Serialization(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error represents a business-rule violation rather than
    /// an infrastructure failure.
    #[must_use]
    pub fn is_business_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Value { .. } | Self::Validation { .. }
        )
    }

    /// Renders the error in the uniform `{message, code, details}` shape
    /// used for external reporting.
    #[must_use]
    pub fn to_details(&self) -> Value {
        let details = match self {
            Self::ProviderNotFound { provider } => json!({ "provider": provider }),
            Self::Parse { paths, .. } => json!({ "paths": paths }),
            Self::Value {
                location, value, ..
            } => json!({ "location": location, "value": value }),
            Self::Validation {
                schema,
                schema_path,
                fragment,
                ..
            } => json!({
                "schema": schema,
                "schema-path": schema_path,
                "schema-fragment": fragment,
            }),
            _ => json!({}),
        };
        json!({
            "message": self.to_string(),
            "code": self.code(),
            "details": details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_not_found_display() {
        let err = Error::ProviderNotFound {
            provider: "invalid".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("unable to find config provider"));
        assert!(display.contains("invalid"));
        assert_eq!(err.code(), "CONFIG_PROVIDER_NOT_FOUND");
    }

    #[test]
    fn test_parse_error_carries_paths() {
        let err = Error::Parse {
            paths: vec!["team".to_string(), "prod".to_string()],
            reason: "bad yaml".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("team"));
        assert!(display.contains("bad yaml"));
        assert!(err.is_business_rule_violation());
    }

    #[test]
    fn test_value_error_details() {
        let err = Error::Value {
            location: "/deployers/url".to_string(),
            value: Value::String("{{broken".to_string()),
            reason: "unexpected end of template".to_string(),
        };
        let details = err.to_details();
        assert_eq!(details["code"], "CONFIG_VALUE_ERROR");
        assert_eq!(details["details"]["location"], "/deployers/url");
    }

    #[test]
    fn test_validation_error_details() {
        let err = Error::Validation {
            schema: "deploy-v1".to_string(),
            schema_path: "/properties/port/type".to_string(),
            reason: "expected integer".to_string(),
            fragment: json!({"type": "integer"}),
        };
        let details = err.to_details();
        assert_eq!(details["details"]["schema"], "deploy-v1");
        assert_eq!(details["details"]["schema-path"], "/properties/port/type");
        assert!(err.is_business_rule_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.is_business_rule_violation());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<()> {
            Err(Error::Settings {
                reason: "test".to_string(),
            })
        }

        assert!(returns_result().is_err());
    }
}
