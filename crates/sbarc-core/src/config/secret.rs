//! Masked string value for credentials passed to external tools.

use std::fmt;

/// Fixed text shown wherever a secret would otherwise be displayed.
pub const REDACTED_PLACEHOLDER: &str = "********";

/// A credential that must never be displayed, logged or persisted.
///
/// `Debug` and `Display` both print [`REDACTED_PLACEHOLDER`]. The real
/// value is only reachable through [`Secret::expose`]. The type does not
/// implement `Serialize`; configuration structs skip it explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The literal value. Only the process runner should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED_PLACEHOLDER})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED_PLACEHOLDER)
    }
}
