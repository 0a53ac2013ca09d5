//! Immutable route definitions.

use std::collections::HashMap;

use crate::error::ConfigurationError;
use crate::routing::pattern::{tokenize, Segment};
use crate::routing::rule::RouteRule;

/// Everything a route's compiled path regex depends on: the pattern and
/// each rule's fragment, ordered by parameter. Names, targets and defaults
/// are not part of it, so rebuilt or renamed routes share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternKey {
    path: String,
    fragments: Vec<(String, String)>,
}

impl PatternKey {
    fn new(path: &str, rules: &HashMap<String, RouteRule>) -> Self {
        let mut fragments: Vec<(String, String)> = rules
            .iter()
            .map(|(name, rule)| (name.clone(), rule.regex().to_string()))
            .collect();
        fragments.sort();
        Self {
            path: path.to_string(),
            fragments,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A named mapping from a path pattern (plus optional method, host and
/// scheme constraints) to an opaque target.
#[derive(Debug, Clone)]
pub struct Route {
    pattern_key: PatternKey,
    name: String,
    path: String,
    segments: Vec<Segment>,
    target: String,
    rules: HashMap<String, RouteRule>,
    method: Option<String>,
    hostname: Option<String>,
    scheme: Option<String>,
}

impl Route {
    /// Start building a route.
    pub fn builder(
        name: impl Into<String>,
        path: impl Into<String>,
        target: impl Into<String>,
    ) -> RouteBuilder {
        RouteBuilder {
            name: name.into(),
            path: path.into(),
            target: target.into(),
            rules: Vec::new(),
            method: None,
            hostname: None,
            scheme: None,
        }
    }

    /// Cache key for the compiled path regex.
    pub fn pattern_key(&self) -> &PatternKey {
        &self.pattern_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern as written, e.g. `/users/{id}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn rules(&self) -> &HashMap<String, RouteRule> {
        &self.rules
    }

    pub fn rule(&self, parameter: &str) -> Option<&RouteRule> {
        self.rules.get(parameter)
    }

    pub fn default_value(&self, parameter: &str) -> Option<&str> {
        self.rules.get(parameter).and_then(RouteRule::default_value)
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Placeholder names in pattern order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// Builder for [`Route`]. `build` tokenizes the pattern and validates names.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    name: String,
    path: String,
    target: String,
    rules: Vec<RouteRule>,
    method: Option<String>,
    hostname: Option<String>,
    scheme: Option<String>,
}

impl RouteBuilder {
    pub fn rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = RouteRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Regex over the request method, e.g. `GET|POST`.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn build(self) -> Result<Route, ConfigurationError> {
        if self.name.is_empty() {
            return Err(ConfigurationError::EmptyRouteName);
        }

        let segments = tokenize(&self.path).map_err(|e| ConfigurationError::InvalidPattern {
            route: self.name.clone(),
            reason: e.to_string(),
        })?;

        let mut rules = HashMap::with_capacity(self.rules.len());
        for rule in self.rules {
            rule.validate(&self.name)?;
            if rules.contains_key(rule.parameter()) {
                return Err(ConfigurationError::DuplicateRule {
                    route: self.name,
                    name: rule.parameter().to_string(),
                });
            }
            rules.insert(rule.parameter().to_string(), rule);
        }

        Ok(Route {
            pattern_key: PatternKey::new(&self.path, &rules),
            name: self.name,
            path: self.path,
            segments,
            target: self.target,
            rules,
            method: self.method.filter(|m| !m.is_empty()),
            hostname: self.hostname.filter(|h| !h.is_empty()),
            scheme: self.scheme.filter(|s| !s.is_empty()),
        })
    }
}
