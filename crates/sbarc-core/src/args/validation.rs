//! Validation errors and the field checks shared by both builders.

use chrono::NaiveDate;
use thiserror::Error;
use url::Url;

/// A configuration problem that prevents building a command.
///
/// Recoverable: the user fixes the field and launches again. No process is
/// started while any of these is present.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} required")]
    Missing { field: &'static str },

    #[error("{field} must be an http:// or https:// URL, got {value:?}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} is not a usable path: {value:?}")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field} must be a date in YYYY-MM-DD format, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("after date {after} is later than before date {before}")]
    DateOrder { after: String, before: String },

    #[error("{field} must be a positive whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must end with .{expected}, got {value:?}")]
    ExtensionMismatch {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Collects errors while a builder walks the configuration.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: Vec<ValidationError>,
}

impl Checks {
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Trimmed value of a required text field.
    pub(crate) fn required<'a>(&mut self, field: &'static str, value: &'a str) -> Option<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(ValidationError::Missing { field });
            None
        } else {
            Some(trimmed)
        }
    }

    pub(crate) fn path(&mut self, field: &'static str, value: &str) -> bool {
        if value.contains('\0') {
            self.push(ValidationError::InvalidPath {
                field,
                value: value.replace('\0', "\\0"),
            });
            false
        } else {
            true
        }
    }

    pub(crate) fn http_url(&mut self, field: &'static str, value: &str) -> bool {
        let ok = Url::parse(value).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
        });
        if !ok {
            self.push(ValidationError::InvalidUrl {
                field,
                value: value.to_string(),
            });
        }
        ok
    }

    /// Parse an optional `YYYY-MM-DD` bound; blank means absent.
    pub(crate) fn date(&mut self, field: &'static str, value: Option<&str>) -> Option<NaiveDate> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = (value.len() == 10)
            .then(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
            .flatten();
        if parsed.is_none() {
            self.push(ValidationError::InvalidDate {
                field,
                value: value.to_string(),
            });
        }
        parsed
    }

    /// Parse an optional positive integer; blank means absent.
    pub(crate) fn positive(&mut self, field: &'static str, value: Option<&str>) -> Option<u32> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        match value.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                self.push(ValidationError::InvalidNumber {
                    field,
                    value: value.to_string(),
                });
                None
            }
        }
    }

    pub(crate) fn extension(&mut self, field: &'static str, value: &str, expected: &'static str) {
        let matches = value
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(expected));
        if !matches {
            self.push(ValidationError::ExtensionMismatch {
                field,
                expected,
                value: value.to_string(),
            });
        }
    }
}
