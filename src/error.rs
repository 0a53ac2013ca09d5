//! Error taxonomy for the route engine.
//!
//! # Categories
//! - Configuration errors: bad patterns, bad regex fragments, duplicate names.
//!   Fatal to the operation that hit them.
//! - Lookup misses: unknown route name, no route for a request. Expected at
//!   runtime; callers map them to a 404-equivalent.
//! - Collector errors: the route table could not be enumerated. The whole
//!   lookup fails; no partial matching.

use std::time::Duration;
use thiserror::Error;

/// A route definition that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Route declared with an empty name.
    #[error("Route name must not be empty")]
    EmptyRouteName,

    /// Path pattern could not be tokenized.
    #[error("Invalid path pattern for route '{route}': {reason}")]
    InvalidPattern { route: String, reason: String },

    /// Placeholder or rule name is not an identifier.
    #[error("Invalid parameter name '{name}' in route '{route}'")]
    InvalidIdentifier { route: String, name: String },

    /// Two rules declared for the same placeholder.
    #[error("Duplicate rule for parameter '{name}' in route '{route}'")]
    DuplicateRule { route: String, name: String },

    /// A regex fragment failed to compile.
    #[error("Invalid regex '{fragment}' in route '{route}': {source}")]
    InvalidRegex {
        route: String,
        fragment: String,
        #[source]
        source: regex::Error,
    },

    /// Two routes share a name and the table rejects shadowing.
    #[error("Duplicate route name '{name}'")]
    DuplicateRouteName { name: String },

    /// Reverse routing found no value for a placeholder.
    #[error("Missing value for parameter '{name}' of route '{route}'")]
    MissingParameter { route: String, name: String },

    /// Reverse routing got a value its rule rejects.
    #[error("Value '{value}' for parameter '{name}' of route '{route}' does not satisfy its rule")]
    InvalidParameterValue {
        route: String,
        name: String,
        value: String,
    },
}

/// Failure while enumerating route collections.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Route collector '{collector}' failed: {source}")]
    Failed {
        collector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CollectorError {
    /// Wrap an arbitrary error with the name of the failing collector.
    pub fn failed<E>(collector: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CollectorError::Failed {
            collector: collector.into(),
            source: source.into(),
        }
    }

    /// Name of the collector that failed.
    pub fn collector(&self) -> &str {
        match self {
            CollectorError::Failed { collector, .. } => collector,
        }
    }
}

/// Errors returned by the [`Router`](crate::routing::Router).
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Route '{name}' not found")]
    RouteNotFound { name: String },

    /// `method` is `None` for path-only matching.
    #[error("No route matches {}{path}", method_prefix(.method))]
    NoMatchingRoute {
        method: Option<String>,
        path: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error("Route resolution exceeded deadline of {0:?}")]
    Timeout(Duration),
}

impl RoutingError {
    /// True for the recoverable "nothing found" conditions.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            RoutingError::RouteNotFound { .. } | RoutingError::NoMatchingRoute { .. }
        )
    }
}

fn method_prefix(method: &Option<String>) -> String {
    method
        .as_deref()
        .map(|method| format!("{} ", method))
        .unwrap_or_default()
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_classification() {
        let miss = RoutingError::RouteNotFound { name: "x".into() };
        assert!(miss.is_lookup_miss());

        let miss = RoutingError::NoMatchingRoute {
            method: Some("GET".into()),
            path: "/nowhere".into(),
        };
        assert!(miss.is_lookup_miss());

        let config = RoutingError::from(ConfigurationError::EmptyRouteName);
        assert!(!config.is_lookup_miss());

        let timeout = RoutingError::Timeout(Duration::from_millis(5));
        assert!(!timeout.is_lookup_miss());
    }

    #[test]
    fn test_error_display() {
        let err = RoutingError::NoMatchingRoute {
            method: Some("DELETE".into()),
            path: "/users/1".into(),
        };
        assert_eq!(err.to_string(), "No route matches DELETE /users/1");

        let err = RoutingError::NoMatchingRoute {
            method: None,
            path: "/users/1".into(),
        };
        assert_eq!(err.to_string(), "No route matches /users/1");

        let err = CollectorError::failed("file:routes.toml", "permission denied");
        assert_eq!(err.collector(), "file:routes.toml");
        assert!(err.to_string().contains("permission denied"));
    }
}
