//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Build every route, surfacing malformed patterns and bad names
//! - Compile every regex fragment (rules, constraints, default placeholder)
//! - Detect duplicate route names when the policy rejects them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: no logging, no shared caches
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{CollectionConfig, DuplicateNamePolicy, EngineConfig, EngineSettings};
use crate::error::ConfigurationError;
use crate::routing::generator::{Constraint, PathRegexGenerator};

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("collection '{collection}': prefix '{prefix}' must start with '/'")]
    InvalidPrefix { collection: String, prefix: String },

    #[error("settings.default_placeholder: {0}")]
    DefaultPlaceholder(#[source] ConfigurationError),

    #[error("collection '{collection}': {source}")]
    Route {
        collection: String,
        #[source]
        source: ConfigurationError,
    },
}

/// Validate an engine configuration's settings and inline collections.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let generator = settings_generator(&config.settings, &mut errors);
    check_collections(
        &config.collections,
        config.settings.duplicate_names,
        &generator,
        &mut errors,
    );
    finish(errors)
}

/// Validate collections loaded from a route file.
pub fn validate_collections(
    collections: &[CollectionConfig],
    settings: &EngineSettings,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let generator = settings_generator(settings, &mut errors);
    check_collections(collections, settings.duplicate_names, &generator, &mut errors);
    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn settings_generator(settings: &EngineSettings, errors: &mut Vec<ValidationError>) -> PathRegexGenerator {
    match PathRegexGenerator::with_default_fragment(settings.default_placeholder.clone()) {
        Ok(generator) => generator,
        Err(e) => {
            errors.push(ValidationError::DefaultPlaceholder(e));
            PathRegexGenerator::new()
        }
    }
}

fn check_collections(
    collections: &[CollectionConfig],
    policy: DuplicateNamePolicy,
    generator: &PathRegexGenerator,
    errors: &mut Vec<ValidationError>,
) {
    let mut names = HashSet::new();

    for collection in collections {
        if let Some(prefix) = &collection.prefix {
            if !prefix.is_empty() && !prefix.starts_with('/') {
                errors.push(ValidationError::InvalidPrefix {
                    collection: collection.identifier.clone(),
                    prefix: prefix.clone(),
                });
            }
        }

        for config in &collection.routes {
            let mut fail = |source: ConfigurationError| {
                errors.push(ValidationError::Route {
                    collection: collection.identifier.clone(),
                    source,
                })
            };

            if !names.insert(config.name.as_str()) && policy == DuplicateNamePolicy::Reject {
                fail(ConfigurationError::DuplicateRouteName {
                    name: config.name.clone(),
                });
            }

            let route = match config.build() {
                Ok(route) => route,
                Err(e) => {
                    fail(e);
                    continue;
                }
            };

            if let Err(e) = generator.generate(&route) {
                fail(e);
            }
            for kind in [Constraint::Method, Constraint::Hostname, Constraint::Scheme] {
                if let Err(e) = generator.constraint(&route, kind) {
                    fail(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> EngineConfig {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            r#"
            [[collections]]
            identifier = "main"
            [[collections.routes]]
            name = "home"
            path = "/"
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = parse(
            r#"
            [settings]
            duplicate_names = "reject"
            default_placeholder = "[^/"

            [[collections]]
            identifier = "broken"
            prefix = "admin"

            [[collections.routes]]
            name = "a"
            path = "/a/{id"

            [[collections.routes]]
            name = "b"
            path = "/b/{id}"
            method = "(GET"
            [[collections.routes.rules]]
            param = "id"
            regex = "[0-9"

            [[collections.routes]]
            name = "b"
            path = "/b2"
            "#,
        );

        let errors = validate_config(&config).unwrap_err();
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();

        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DefaultPlaceholder(_))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPrefix { .. })));
        assert!(rendered.iter().any(|e| e.contains("Invalid path pattern")));
        assert!(rendered.iter().any(|e| e.contains("'[0-9'")));
        assert!(rendered.iter().any(|e| e.contains("'(GET'")));
        assert!(rendered.iter().any(|e| e.contains("Duplicate route name 'b'")));
    }

    #[test]
    fn test_duplicates_allowed_when_shadowing() {
        let config = parse(
            r#"
            [[collections]]
            [[collections.routes]]
            name = "dup"
            path = "/one"
            [[collections.routes]]
            name = "dup"
            path = "/two"
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }
}
