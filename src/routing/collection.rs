//! Ordered, optionally prefix-scoped groups of routes.

use std::sync::Arc;

use crate::routing::route::Route;

/// Routes sharing an optional path prefix. Insertion order is match priority.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    identifier: String,
    prefix: Option<String>,
    routes: Vec<Arc<Route>>,
}

impl RouteCollection {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            prefix: None,
            routes: Vec::new(),
        }
    }

    /// Requests whose path does not start with `prefix` skip the whole collection.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.push(route);
        self
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(Arc::new(route));
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn has_path(&self) -> bool {
        self.prefix.is_some()
    }

    pub fn path(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Extend<Route> for RouteCollection {
    fn extend<T: IntoIterator<Item = Route>>(&mut self, iter: T) {
        self.routes.extend(iter.into_iter().map(Arc::new));
    }
}
