//! Configuration schema definitions.
//!
//! This module defines the declarative route-table format.
//! All types derive Serde traits for deserialization from TOML files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::routing::generator::DEFAULT_PLACEHOLDER_FRAGMENT;
use crate::routing::{Route, RouteCollection, RouteRule, RouterOptions};

/// Root configuration: engine settings plus inline route collections.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine-wide settings.
    pub settings: EngineSettings,

    /// Collections declared inline, searched before `settings.route_files`.
    pub collections: Vec<CollectionConfig>,
}

impl EngineConfig {
    /// Build every inline collection.
    pub fn build_collections(&self) -> Result<Vec<RouteCollection>, ConfigurationError> {
        self.collections.iter().map(CollectionConfig::build).collect()
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            duplicate_names: self.settings.duplicate_names,
        }
    }
}

/// What to do when two routes share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// First declaration wins; later ones are unreachable by name.
    #[default]
    Shadow,
    /// Treat a repeated name as a configuration error.
    Reject,
}

/// Engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Duplicate route name handling.
    pub duplicate_names: DuplicateNamePolicy,

    /// Regex used for placeholders that have no rule.
    pub default_placeholder: String,

    /// Deadline for a single request resolution in milliseconds.
    pub resolve_timeout_ms: u64,

    /// Additional route files, relative to the configuration file.
    pub route_files: Vec<PathBuf>,
}

impl EngineSettings {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            duplicate_names: DuplicateNamePolicy::Shadow,
            default_placeholder: DEFAULT_PLACEHOLDER_FRAGMENT.to_string(),
            resolve_timeout_ms: 250,
            route_files: Vec::new(),
        }
    }
}

/// A route file: collections only.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteFile {
    pub collections: Vec<CollectionConfig>,
}

impl RouteFile {
    pub fn build_collections(&self) -> Result<Vec<RouteCollection>, ConfigurationError> {
        self.collections.iter().map(CollectionConfig::build).collect()
    }
}

/// One route collection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CollectionConfig {
    /// Identifier for logging.
    #[serde(default)]
    pub identifier: String,

    /// Path prefix every route in the collection shares.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Routes in match-priority order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl CollectionConfig {
    pub fn build(&self) -> Result<RouteCollection, ConfigurationError> {
        let mut collection = RouteCollection::new(self.identifier.clone());
        if let Some(prefix) = &self.prefix {
            collection = collection.with_prefix(prefix.clone());
        }
        for route in &self.routes {
            collection.push(route.build()?);
        }
        Ok(collection)
    }
}

/// One route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route name.
    pub name: String,

    /// Path pattern with `{placeholder}` segments.
    pub path: String,

    /// Opaque action identifier handed back on match.
    #[serde(default)]
    pub target: String,

    /// Method regex, e.g. `GET|POST`.
    #[serde(default)]
    pub method: Option<String>,

    /// Hostname regex.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Scheme regex.
    #[serde(default)]
    pub scheme: Option<String>,

    /// Placeholder rules.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl RouteConfig {
    pub fn build(&self) -> Result<Route, ConfigurationError> {
        let mut builder = Route::builder(self.name.clone(), self.path.clone(), self.target.clone())
            .rules(self.rules.iter().map(RuleConfig::to_rule));
        if let Some(method) = &self.method {
            builder = builder.method(method.clone());
        }
        if let Some(hostname) = &self.hostname {
            builder = builder.hostname(hostname.clone());
        }
        if let Some(scheme) = &self.scheme {
            builder = builder.scheme(scheme.clone());
        }
        builder.build()
    }
}

/// Constraint for one placeholder.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Placeholder name.
    pub param: String,

    /// Regex fragment the value must match.
    pub regex: String,

    /// Value used when the capture is empty or absent.
    #[serde(default)]
    pub default: Option<String>,
}

impl RuleConfig {
    pub fn to_rule(&self) -> RouteRule {
        let rule = RouteRule::new(self.param.clone(), self.regex.clone());
        match &self.default {
            Some(default) => rule.with_default(default.clone()),
            None => rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [settings]
        duplicate_names = "reject"
        resolve_timeout_ms = 100

        [[collections]]
        identifier = "articles"
        prefix = "/articles"

        [[collections.routes]]
        name = "article.show"
        path = "/articles/{slug}"
        target = "ArticleController::show"
        method = "GET|HEAD"

        [[collections.routes.rules]]
        param = "slug"
        regex = "[a-z0-9\\-]+"
    "#;

    #[test]
    fn test_parse_sample() {
        let config: EngineConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.settings.duplicate_names, DuplicateNamePolicy::Reject);
        assert_eq!(config.settings.resolve_timeout(), Duration::from_millis(100));
        assert_eq!(config.settings.log_level, "info");
        assert_eq!(config.settings.default_placeholder, "[^/]+");

        let collections = config.build_collections().unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].path(), Some("/articles"));

        let route = &collections[0].routes()[0];
        assert_eq!(route.name(), "article.show");
        assert_eq!(route.method(), Some("GET|HEAD"));
        assert_eq!(route.rule("slug").unwrap().regex(), r"[a-z0-9\-]+");
    }

    #[test]
    fn test_defaults_allow_empty_config() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert!(config.collections.is_empty());
        assert_eq!(config.router_options().duplicate_names, DuplicateNamePolicy::Shadow);
    }

    #[test]
    fn test_rule_default_roundtrip() {
        let rule = RuleConfig {
            param: "page".into(),
            regex: "[0-9]*".into(),
            default: Some("1".into()),
        }
        .to_rule();
        assert_eq!(rule.default_value(), Some("1"));
    }
}
