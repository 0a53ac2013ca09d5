//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Find a route by name
//! - Find the first route matching a request, with its parameters
//! - Build paths for named routes (reverse routing)
//! - Verify a route table up front (duplicate names, bad regexes)
//!
//! # Design Decisions
//! - Search order: collector order, then collection insertion order; first match wins
//! - The table is re-collected on every lookup; caching is the collector's job
//! - A collector failure fails the whole lookup; no partial matching
//! - Duplicate names shadow silently on lookup; `verify` applies the policy

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::collector::RouteCollector;
use crate::config::DuplicateNamePolicy;
use crate::error::{ConfigurationError, RoutingError, RoutingResult};
use crate::observability::metrics;
use crate::routing::collection::RouteCollection;
use crate::routing::generator::{Constraint, PathRegexGenerator};
use crate::routing::matcher::{
    BasicRouteMatcher, HttpRouteMatcher, MatchOutcome, RouteMatcher, RouteParameters,
};
use crate::routing::pattern::Segment;
use crate::routing::request::{HttpRouteRequest, RequestParts};
use crate::routing::route::Route;

/// Router behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    pub duplicate_names: DuplicateNamePolicy,
}

/// A matched route and its parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    parameters: RouteParameters,
}

impl RouteMatch {
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn parameters(&self) -> &RouteParameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn into_parts(self) -> (Arc<Route>, RouteParameters) {
        (self.route, self.parameters)
    }
}

/// Result of [`Router::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTableSummary {
    pub collections: usize,
    pub routes: usize,
    /// Names declared more than once (later declarations are shadowed).
    pub shadowed: Vec<String>,
}

/// Answers "find by name" and "find by request" over a collector's route table.
#[derive(Debug)]
pub struct Router<C> {
    collector: C,
    generator: Arc<PathRegexGenerator>,
    options: RouterOptions,
}

impl<C: RouteCollector> Router<C> {
    pub fn new(collector: C) -> Self {
        Self::with_generator(collector, Arc::new(PathRegexGenerator::new()), RouterOptions::default())
    }

    pub fn with_options(collector: C, options: RouterOptions) -> Self {
        Self::with_generator(collector, Arc::new(PathRegexGenerator::new()), options)
    }

    /// Share a generator (and its compiled-pattern cache) with other routers.
    pub fn with_generator(
        collector: C,
        generator: Arc<PathRegexGenerator>,
        options: RouterOptions,
    ) -> Self {
        Self {
            collector,
            generator,
            options,
        }
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn generator(&self) -> &PathRegexGenerator {
        &self.generator
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// First route named `name`.
    pub fn get_route(&self, name: &str) -> RoutingResult<Arc<Route>> {
        self.find_by_name(name)?
            .ok_or_else(|| RoutingError::RouteNotFound {
                name: name.to_string(),
            })
    }

    /// Whether any route is named `name`. Collector failures still propagate.
    pub fn has_route(&self, name: &str) -> RoutingResult<bool> {
        Ok(self.find_by_name(name)?.is_some())
    }

    /// Match on path alone.
    pub fn match_path(&self, path: &str) -> RoutingResult<RouteMatch> {
        self.resolve(&BasicRouteMatcher::new(path, &self.generator))
    }

    /// Match on method, hostname, scheme and path.
    pub fn match_request<R: HttpRouteRequest + ?Sized>(&self, request: &R) -> RoutingResult<RouteMatch> {
        self.resolve(&HttpRouteMatcher::new(request, &self.generator))
    }

    /// Walk the table with an arbitrary matcher.
    pub fn resolve<M: RouteMatcher>(&self, matcher: &M) -> RoutingResult<RouteMatch> {
        let started = Instant::now();
        let result = self.first_match(matcher);

        let outcome = match &result {
            Ok(found) => {
                tracing::debug!(
                    method = matcher.request_method().unwrap_or("*"),
                    path = %matcher.request_path(),
                    route = %found.route.name(),
                    "Route matched"
                );
                "matched"
            }
            Err(e) if e.is_lookup_miss() => {
                tracing::debug!(
                    method = matcher.request_method().unwrap_or("*"),
                    path = %matcher.request_path(),
                    "No route matched"
                );
                "miss"
            }
            Err(e) => {
                tracing::warn!(path = %matcher.request_path(), error = %e, "Route resolution failed");
                "error"
            }
        };
        metrics::record_resolution(outcome, started.elapsed());

        result
    }

    /// Enumerate the whole table once: apply the duplicate-name policy and
    /// compile every pattern and constraint so bad configuration fails now.
    pub fn verify(&self) -> RoutingResult<RouteTableSummary> {
        let collections = self.collections()?;
        let mut summary = RouteTableSummary {
            collections: collections.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for collection in &collections {
            for route in collection.routes() {
                summary.routes += 1;

                if !seen.insert(route.name()) {
                    match self.options.duplicate_names {
                        DuplicateNamePolicy::Reject => {
                            return Err(ConfigurationError::DuplicateRouteName {
                                name: route.name().to_string(),
                            }
                            .into());
                        }
                        DuplicateNamePolicy::Shadow => {
                            tracing::warn!(
                                route = %route.name(),
                                collection = %collection.identifier(),
                                "Duplicate route name is shadowed by an earlier declaration"
                            );
                            summary.shadowed.push(route.name().to_string());
                        }
                    }
                }

                self.generator.generate(route)?;
                for kind in [Constraint::Method, Constraint::Hostname, Constraint::Scheme] {
                    self.generator.constraint(route, kind)?;
                }
            }
        }

        tracing::info!(
            collections = summary.collections,
            routes = summary.routes,
            shadowed = summary.shadowed.len(),
            "Route table verified"
        );
        Ok(summary)
    }

    /// Build the path for a named route, substituting `parameters` and
    /// falling back to rule defaults.
    pub fn generate_path(&self, name: &str, parameters: &RouteParameters) -> RoutingResult<String> {
        let route = self.get_route(name)?;
        let mut path = String::with_capacity(route.path().len());

        for segment in route.segments() {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let value = parameters
                        .get(placeholder)
                        .map(String::as_str)
                        .filter(|v| !v.is_empty())
                        .or_else(|| route.default_value(placeholder))
                        .ok_or_else(|| ConfigurationError::MissingParameter {
                            route: route.name().to_string(),
                            name: placeholder.clone(),
                        })?;
                    path.push_str(value);
                }
            }
        }

        if !self.generator.generate(&route)?.is_match(&path) {
            return Err(self.blame_parameter(&route, parameters).into());
        }
        Ok(path)
    }

    fn blame_parameter(&self, route: &Route, parameters: &RouteParameters) -> ConfigurationError {
        for placeholder in route.placeholders() {
            let fragment = route
                .rule(placeholder)
                .map(|rule| rule.regex())
                .unwrap_or(self.generator.default_fragment());
            let value = parameters
                .get(placeholder)
                .map(String::as_str)
                .or_else(|| route.default_value(placeholder))
                .unwrap_or_default();
            let accepted = regex::Regex::new(&format!("^(?:{})$", fragment))
                .map(|re| re.is_match(value))
                .unwrap_or(false);
            if !accepted {
                return ConfigurationError::InvalidParameterValue {
                    route: route.name().to_string(),
                    name: placeholder.to_string(),
                    value: value.to_string(),
                };
            }
        }
        ConfigurationError::InvalidParameterValue {
            route: route.name().to_string(),
            name: String::new(),
            value: String::new(),
        }
    }

    fn collections(&self) -> RoutingResult<Vec<Arc<RouteCollection>>> {
        self.collector.collect().map_err(|e| {
            metrics::record_collector_failure(e.collector());
            RoutingError::from(e)
        })
    }

    fn find_by_name(&self, name: &str) -> RoutingResult<Option<Arc<Route>>> {
        let found = self
            .collections()?
            .iter()
            .flat_map(|collection| collection.routes())
            .find(|route| route.name() == name)
            .cloned();
        Ok(found)
    }

    fn first_match<M: RouteMatcher>(&self, matcher: &M) -> RoutingResult<RouteMatch> {
        for collection in self.collections()? {
            if !matcher.matches_collection(&collection) {
                tracing::trace!(
                    collection = %collection.identifier(),
                    "Collection skipped by prefix"
                );
                continue;
            }
            for route in collection.routes() {
                if let MatchOutcome::Matched(parameters) = matcher.matches_route(route)? {
                    return Ok(RouteMatch {
                        route: Arc::clone(route),
                        parameters,
                    });
                }
            }
        }

        Err(RoutingError::NoMatchingRoute {
            method: matcher.request_method().map(str::to_string),
            path: matcher.request_path().to_string(),
        })
    }
}

impl<C: RouteCollector + 'static> Router<C> {
    /// Resolve on the blocking pool, giving up after `deadline`.
    ///
    /// A collector that blocks past the deadline keeps running in the
    /// background; its result is discarded.
    pub async fn resolve_within(
        self: &Arc<Self>,
        request: RequestParts,
        deadline: Duration,
    ) -> RoutingResult<RouteMatch> {
        let router = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || router.match_request(&request));

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(deadline = ?deadline, "Route resolution timed out");
                metrics::record_resolution("timeout", deadline);
                Err(RoutingError::Timeout(deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::StaticCollector;
    use crate::routing::rule::RouteRule;

    fn route(name: &str, path: &str) -> Route {
        Route::builder(name, path, format!("{name}.target")).build().unwrap()
    }

    fn router(collections: Vec<RouteCollection>) -> Router<StaticCollector> {
        Router::new(StaticCollector::new(collections))
    }

    #[test]
    fn test_get_route_by_name() {
        let router = router(vec![
            RouteCollection::new("a")
                .with_route(route("home", "/"))
                .with_route(route("about", "/about")),
            RouteCollection::new("b").with_route(route("contact", "/contact")),
        ]);

        assert_eq!(router.get_route("contact").unwrap().path(), "/contact");
        assert!(router.has_route("about").unwrap());
        assert!(!router.has_route("missing").unwrap());
        assert!(matches!(
            router.get_route("missing").unwrap_err(),
            RoutingError::RouteNotFound { .. }
        ));
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        let router = router(vec![
            RouteCollection::new("a").with_route(route("dup", "/first")),
            RouteCollection::new("b").with_route(route("dup", "/second")),
        ]);
        assert_eq!(router.get_route("dup").unwrap().path(), "/first");

        let summary = router.verify().unwrap();
        assert_eq!(summary.collections, 2);
        assert_eq!(summary.routes, 2);
        assert_eq!(summary.shadowed, vec!["dup".to_string()]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let router = Router::with_options(
            StaticCollector::new(vec![RouteCollection::new("a")
                .with_route(route("dup", "/first"))
                .with_route(route("dup", "/second"))]),
            RouterOptions {
                duplicate_names: DuplicateNamePolicy::Reject,
            },
        );
        assert!(matches!(
            router.verify().unwrap_err(),
            RoutingError::Configuration(ConfigurationError::DuplicateRouteName { .. })
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let router = router(vec![RouteCollection::new("a")
            .with_route(route("specific", "/posts/{id}"))
            .with_route(route("generic", "/posts/{slug}"))]);

        let found = router.match_path("/posts/42").unwrap();
        assert_eq!(found.route().name(), "specific");
        assert_eq!(found.parameter("id"), Some("42"));
    }

    #[test]
    fn test_verify_surfaces_bad_regex() {
        let router = router(vec![RouteCollection::new("a").with_route(
            Route::builder("bad", "/x/{id}", "t")
                .rule(RouteRule::new("id", "(unclosed"))
                .build()
                .unwrap(),
        )]);
        assert!(matches!(
            router.verify().unwrap_err(),
            RoutingError::Configuration(ConfigurationError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_generate_path() {
        let router = router(vec![RouteCollection::new("a").with_route(
            Route::builder("archive", "/archive/{year}/{page}", "t")
                .rule(RouteRule::new("year", "[0-9]{4}"))
                .rule(RouteRule::new("page", "[0-9]+").with_default("1"))
                .build()
                .unwrap(),
        )]);

        let mut params = RouteParameters::new();
        params.insert("year".into(), "2024".into());
        assert_eq!(router.generate_path("archive", &params).unwrap(), "/archive/2024/1");

        params.insert("page".into(), "3".into());
        assert_eq!(router.generate_path("archive", &params).unwrap(), "/archive/2024/3");

        params.insert("year".into(), "24".into());
        match router.generate_path("archive", &params).unwrap_err() {
            RoutingError::Configuration(ConfigurationError::InvalidParameterValue { name, .. }) => {
                assert_eq!(name, "year")
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            router.generate_path("archive", &RouteParameters::new()).unwrap_err(),
            RoutingError::Configuration(ConfigurationError::MissingParameter { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_within_deadline() {
        let router = Arc::new(router(vec![
            RouteCollection::new("a").with_route(route("home", "/"))
        ]));

        let found = router
            .resolve_within(RequestParts::new("/"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(found.route().name(), "home");

        let err = router
            .resolve_within(RequestParts::new("/nope"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_lookup_miss());
    }
}
