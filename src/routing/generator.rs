//! Path pattern compilation.
//!
//! # Responsibilities
//! - Compile a route's pattern into one anchored regex with named groups
//! - Compile method/hostname/scheme constraints into case-insensitive tests
//! - Memoize both by content for the lifetime of the generator
//!
//! # Design Decisions
//! - Literal segments are escaped; only rule fragments carry regex syntax
//! - Placeholders without a rule use [`DEFAULT_PLACEHOLDER_FRAGMENT`]
//! - Path cache keyed by [`PatternKey`], constraint cache by fragment text;
//!   routes rebuilt on every collect reuse the existing entries
//! - First-time compilation holds the cache shard lock, so concurrent
//!   callers for the same route compile once and share the result
//! - Every fragment must compile on its own before it is embedded
//! - Invalid fragments surface as [`ConfigurationError::InvalidRegex`] on first use

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;

use crate::error::ConfigurationError;
use crate::observability::metrics;
use crate::routing::pattern::Segment;
use crate::routing::route::{PatternKey, Route};

/// One or more characters up to the next `/`.
pub const DEFAULT_PLACEHOLDER_FRAGMENT: &str = "[^/]+";

/// A compiled, anchored path regex and the placeholder names it captures.
#[derive(Debug)]
pub struct CompiledPattern {
    regex: Regex,
    captures: Vec<String>,
}

impl CompiledPattern {
    /// The regex source, e.g. `^/users/(?P<id>[0-9]+)$`.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Placeholder names in pattern order.
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Request attributes a route may constrain besides its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Method,
    Hostname,
    Scheme,
}

impl Constraint {
    fn fragment(self, route: &Route) -> Option<&str> {
        match self {
            Constraint::Method => route.method(),
            Constraint::Hostname => route.hostname(),
            Constraint::Scheme => route.scheme(),
        }
    }
}

/// Compiles and caches route patterns.
#[derive(Debug)]
pub struct PathRegexGenerator {
    default_fragment: String,
    patterns: DashMap<PatternKey, Arc<CompiledPattern>>,
    constraints: DashMap<String, Arc<Regex>>,
    compilations: AtomicUsize,
}

impl PathRegexGenerator {
    pub fn new() -> Self {
        Self {
            default_fragment: DEFAULT_PLACEHOLDER_FRAGMENT.to_string(),
            patterns: DashMap::new(),
            constraints: DashMap::new(),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Use a different fragment for placeholders that have no rule.
    pub fn with_default_fragment(fragment: impl Into<String>) -> Result<Self, ConfigurationError> {
        let fragment = fragment.into();
        check_fragment("<default placeholder>", &fragment)?;

        Ok(Self {
            default_fragment: fragment,
            ..Self::new()
        })
    }

    pub fn default_fragment(&self) -> &str {
        &self.default_fragment
    }

    /// Return the compiled pattern for `route`, compiling it on first use.
    pub fn generate(&self, route: &Route) -> Result<Arc<CompiledPattern>, ConfigurationError> {
        let key = route.pattern_key();
        if let Some(hit) = self.patterns.get(key) {
            return Ok(Arc::clone(hit.value()));
        }

        let entry = self
            .patterns
            .entry(key.clone())
            .or_try_insert_with(|| self.compile(route).map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    /// Return the case-insensitive anchored test for one of the route's
    /// constraints, or `None` when the route does not declare it.
    pub fn constraint(
        &self,
        route: &Route,
        kind: Constraint,
    ) -> Result<Option<Arc<Regex>>, ConfigurationError> {
        let Some(fragment) = kind.fragment(route) else {
            return Ok(None);
        };

        if let Some(hit) = self.constraints.get(fragment) {
            return Ok(Some(Arc::clone(hit.value())));
        }

        let entry = self
            .constraints
            .entry(fragment.to_string())
            .or_try_insert_with(|| -> Result<_, ConfigurationError> {
                check_fragment(route.name(), fragment)?;
                Regex::new(&format!("(?i)^(?:{})$", fragment))
                    .map(Arc::new)
                    .map_err(|source| invalid(route.name(), fragment, source))
            })?;
        Ok(Some(Arc::clone(entry.value())))
    }

    /// Number of path patterns compiled so far.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of cached path patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn compile(&self, route: &Route) -> Result<CompiledPattern, ConfigurationError> {
        let mut rules: Vec<_> = route.rules().iter().collect();
        rules.sort_by(|a, b| a.0.cmp(b.0));
        for (_, rule) in rules {
            check_fragment(route.name(), rule.regex())?;
        }

        let mut source = String::from("^");
        let mut captures = Vec::new();

        for segment in route.segments() {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Placeholder(name) => {
                    let fragment = self.fragment_for(route, name);
                    source.push_str(&format!("(?P<{}>{})", name, fragment));
                    captures.push(name.clone());
                }
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(route.name(), &source, e))?;

        self.compilations.fetch_add(1, Ordering::Relaxed);
        metrics::record_compilation();
        tracing::debug!(route = %route.name(), pattern = %source, "Compiled route pattern");

        Ok(CompiledPattern { regex, captures })
    }

    fn fragment_for<'a>(&'a self, route: &'a Route, name: &str) -> &'a str {
        route
            .rule(name)
            .map(|rule| rule.regex())
            .unwrap_or(self.default_fragment.as_str())
    }
}

/// A fragment must be a complete regex by itself. One that only compiles
/// once embedded, such as `[0-9]+)|(.*`, would close the surrounding group
/// and escape the anchors.
fn check_fragment(route: &str, fragment: &str) -> Result<(), ConfigurationError> {
    Regex::new(fragment)
        .and_then(|_| Regex::new(&format!("^(?:{})$", fragment)))
        .map(drop)
        .map_err(|source| invalid(route, fragment, source))
}

fn invalid(route: &str, fragment: &str, source: regex::Error) -> ConfigurationError {
    ConfigurationError::InvalidRegex {
        route: route.to_string(),
        fragment: fragment.to_string(),
        source,
    }
}

impl Default for PathRegexGenerator {
    fn default() -> Self {
        Self::new()
    }
}
