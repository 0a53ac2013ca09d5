//! Per-placeholder constraints.

use crate::error::ConfigurationError;

/// Regex constraint and optional default bound to one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    parameter: String,
    regex: String,
    default: Option<String>,
}

impl RouteRule {
    /// Create a rule without a default value.
    ///
    /// The fragment is embedded as-is inside a named group; its regex
    /// validity is checked when the owning route is first compiled.
    pub fn new(parameter: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            regex: regex.into(),
            default: None,
        }
    }

    /// Attach a default used when the capture is empty or absent.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Check the parameter name against the identifier grammar.
    pub(crate) fn validate(&self, route: &str) -> Result<(), ConfigurationError> {
        if is_identifier(&self.parameter) {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidIdentifier {
                route: route.to_string(),
                name: self.parameter.clone(),
            })
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
