//! Route matching logic.
//!
//! # Responsibilities
//! - Cheap collection pre-check: path prefix (case-sensitive)
//! - Method/hostname/scheme gating (HTTP matcher only, case-insensitive)
//! - Path test against the compiled, anchored route regex
//! - Parameter extraction with rule defaults
//!
//! # Design Decisions
//! - `matches_route` returns the parameters with the verdict; matchers keep
//!   no "last match" state and can be shared freely
//! - Empty captures fall back to the rule default; values with neither are omitted
//! - Rules whose placeholder is absent from the path contribute only their default
//! - Constraint checks run before the path regex is compiled or evaluated

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::ConfigurationError;
use crate::routing::collection::RouteCollection;
use crate::routing::generator::{CompiledPattern, Constraint, PathRegexGenerator};
use crate::routing::request::{HttpRouteRequest, RouteRequest};
use crate::routing::route::Route;

/// Placeholder name to extracted (or default) value.
pub type RouteParameters = BTreeMap<String, String>;

/// Verdict of a single route test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    Matched(RouteParameters),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn into_parameters(self) -> Option<RouteParameters> {
        match self {
            MatchOutcome::Matched(parameters) => Some(parameters),
            MatchOutcome::NoMatch => None,
        }
    }
}

/// Decides whether a request matches collections and routes.
pub trait RouteMatcher {
    /// False when no route in `collection` can possibly match.
    fn matches_collection(&self, collection: &RouteCollection) -> bool;

    /// Test one route. Errors only for unusable route configuration.
    fn matches_route(&self, route: &Route) -> Result<MatchOutcome, ConfigurationError>;

    /// Path being matched, for diagnostics.
    fn request_path(&self) -> &str;

    /// Method being matched, for diagnostics. `None` when the matcher
    /// ignores the method.
    fn request_method(&self) -> Option<&str>;
}

/// Matches on path only.
#[derive(Debug)]
pub struct BasicRouteMatcher<'a, R: RouteRequest + ?Sized> {
    request: &'a R,
    generator: &'a PathRegexGenerator,
}

impl<'a, R: RouteRequest + ?Sized> BasicRouteMatcher<'a, R> {
    pub fn new(request: &'a R, generator: &'a PathRegexGenerator) -> Self {
        Self { request, generator }
    }
}

impl<R: RouteRequest + ?Sized> RouteMatcher for BasicRouteMatcher<'_, R> {
    fn matches_collection(&self, collection: &RouteCollection) -> bool {
        prefix_matches(collection, self.request.path())
    }

    fn matches_route(&self, route: &Route) -> Result<MatchOutcome, ConfigurationError> {
        let compiled = self.generator.generate(route)?;
        Ok(extract_parameters(route, &compiled, self.request.path()))
    }

    fn request_path(&self) -> &str {
        self.request.path()
    }

    fn request_method(&self) -> Option<&str> {
        None
    }
}

/// Matches on method, hostname and scheme constraints, then path.
#[derive(Debug)]
pub struct HttpRouteMatcher<'a, R: HttpRouteRequest + ?Sized> {
    request: &'a R,
    generator: &'a PathRegexGenerator,
}

impl<'a, R: HttpRouteRequest + ?Sized> HttpRouteMatcher<'a, R> {
    pub fn new(request: &'a R, generator: &'a PathRegexGenerator) -> Self {
        Self { request, generator }
    }

    fn attribute(&self, kind: Constraint) -> &str {
        match kind {
            Constraint::Method => self.request.method(),
            Constraint::Hostname => self.request.hostname(),
            Constraint::Scheme => self.request.scheme(),
        }
    }

    fn constraints_hold(&self, route: &Route) -> Result<bool, ConfigurationError> {
        for kind in [Constraint::Method, Constraint::Hostname, Constraint::Scheme] {
            let test: Option<std::sync::Arc<Regex>> = self.generator.constraint(route, kind)?;
            if let Some(test) = test {
                let value = self.attribute(kind);
                if !test.is_match(value) {
                    tracing::trace!(
                        route = %route.name(),
                        constraint = ?kind,
                        value = %value,
                        "Route constraint rejected request"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

impl<R: HttpRouteRequest + ?Sized> RouteMatcher for HttpRouteMatcher<'_, R> {
    fn matches_collection(&self, collection: &RouteCollection) -> bool {
        prefix_matches(collection, self.request.path())
    }

    fn matches_route(&self, route: &Route) -> Result<MatchOutcome, ConfigurationError> {
        if !self.constraints_hold(route)? {
            return Ok(MatchOutcome::NoMatch);
        }
        let compiled = self.generator.generate(route)?;
        Ok(extract_parameters(route, &compiled, self.request.path()))
    }

    fn request_path(&self) -> &str {
        self.request.path()
    }

    fn request_method(&self) -> Option<&str> {
        Some(self.request.method())
    }
}

fn prefix_matches(collection: &RouteCollection, path: &str) -> bool {
    collection
        .path()
        .map_or(true, |prefix| path.starts_with(prefix))
}

fn extract_parameters(route: &Route, compiled: &CompiledPattern, path: &str) -> MatchOutcome {
    let Some(captures) = compiled.regex().captures(path) else {
        return MatchOutcome::NoMatch;
    };

    let mut parameters = RouteParameters::new();
    for name in compiled.captures() {
        let value = captures
            .name(name)
            .map(|m| m.as_str())
            .filter(|v| !v.is_empty())
            .or_else(|| route.default_value(name));
        if let Some(value) = value {
            parameters.insert(name.clone(), value.to_string());
        }
    }

    for (name, rule) in route.rules() {
        if let Some(default) = rule.default_value() {
            parameters
                .entry(name.clone())
                .or_insert_with(|| default.to_string());
        }
    }

    MatchOutcome::Matched(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::request::RequestParts;
    use crate::routing::rule::RouteRule;

    fn user_route() -> Route {
        Route::builder("user.show", "/user/{id}", "UserController::show")
            .rule(RouteRule::new("id", "[0-9]+"))
            .build()
            .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> RouteParameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_placeholder_with_rule() {
        let generator = PathRegexGenerator::new();
        let route = user_route();

        let matcher = BasicRouteMatcher::new("/user/42", &generator);
        assert_eq!(
            matcher.matches_route(&route).unwrap(),
            MatchOutcome::Matched(params(&[("id", "42")]))
        );

        let matcher = BasicRouteMatcher::new("/user/abc", &generator);
        assert_eq!(matcher.matches_route(&route).unwrap(), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_default_value_fallback() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("user.show", "/user/{id}", "t")
            .rule(RouteRule::new("id", "[0-9]*").with_default("0"))
            .build()
            .unwrap();

        let matcher = BasicRouteMatcher::new("/user/", &generator);
        assert_eq!(
            matcher.matches_route(&route).unwrap(),
            MatchOutcome::Matched(params(&[("id", "0")]))
        );
    }

    #[test]
    fn test_empty_capture_without_default_is_omitted() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("r", "/page/{n}", "t")
            .rule(RouteRule::new("n", "[0-9]*"))
            .build()
            .unwrap();

        let matcher = BasicRouteMatcher::new("/page/", &generator);
        assert_eq!(
            matcher.matches_route(&route).unwrap(),
            MatchOutcome::Matched(RouteParameters::new())
        );
    }

    #[test]
    fn test_unruled_placeholder_and_extra_defaults() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("r", "/blog/{slug}", "t")
            .rule(RouteRule::new("format", "html|json").with_default("html"))
            .build()
            .unwrap();

        let matcher = BasicRouteMatcher::new("/blog/first-post", &generator);
        assert_eq!(
            matcher.matches_route(&route).unwrap(),
            MatchOutcome::Matched(params(&[("format", "html"), ("slug", "first-post")]))
        );
    }

    #[test]
    fn test_method_gating() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("r", "/items", "t")
            .method("GET|POST")
            .build()
            .unwrap();

        let delete = RequestParts::new("/items").with_method("DELETE");
        assert_eq!(
            HttpRouteMatcher::new(&delete, &generator)
                .matches_route(&route)
                .unwrap(),
            MatchOutcome::NoMatch
        );
        // rejected before the path pattern is compiled
        assert_eq!(generator.compilations(), 0);

        let post = RequestParts::new("/items").with_method("post");
        assert!(HttpRouteMatcher::new(&post, &generator)
            .matches_route(&route)
            .unwrap()
            .is_match());
    }

    #[test]
    fn test_host_and_scheme_gating() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("r", "/", "t")
            .hostname(r"(www\.)?example\.com")
            .scheme("https")
            .build()
            .unwrap();

        let ok = RequestParts::new("/")
            .with_hostname("WWW.Example.com")
            .with_scheme("HTTPS");
        assert!(HttpRouteMatcher::new(&ok, &generator)
            .matches_route(&route)
            .unwrap()
            .is_match());

        let wrong_host = RequestParts::new("/")
            .with_hostname("evil-example.com")
            .with_scheme("https");
        assert!(!HttpRouteMatcher::new(&wrong_host, &generator)
            .matches_route(&route)
            .unwrap()
            .is_match());

        let wrong_scheme = RequestParts::new("/").with_hostname("example.com");
        assert!(!HttpRouteMatcher::new(&wrong_scheme, &generator)
            .matches_route(&route)
            .unwrap()
            .is_match());
    }

    #[test]
    fn test_basic_matcher_ignores_constraints() {
        let generator = PathRegexGenerator::new();
        let route = Route::builder("r", "/items", "t")
            .method("POST")
            .build()
            .unwrap();

        assert!(BasicRouteMatcher::new("/items", &generator)
            .matches_route(&route)
            .unwrap()
            .is_match());
    }

    #[test]
    fn test_collection_prefix_check() {
        let generator = PathRegexGenerator::new();
        let admin = RouteCollection::new("admin").with_prefix("/admin");
        let open = RouteCollection::new("open");

        let public = BasicRouteMatcher::new("/public/x", &generator);
        assert!(!public.matches_collection(&admin));
        assert!(public.matches_collection(&open));

        let inside = BasicRouteMatcher::new("/admin/users", &generator);
        assert!(inside.matches_collection(&admin));

        let upper = BasicRouteMatcher::new("/ADMIN/users", &generator);
        assert!(!upper.matches_collection(&admin));
    }
}
