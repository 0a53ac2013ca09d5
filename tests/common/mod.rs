//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use route_engine::collector::{RouteCollector, StaticCollector};
use route_engine::routing::{Route, RouteCollection, RouteRule};
use route_engine::CollectorError;

/// Collector that counts how often the table is enumerated.
#[derive(Debug, Default)]
pub struct SpyCollector {
    inner: StaticCollector,
    calls: AtomicUsize,
}

impl SpyCollector {
    pub fn new(collections: Vec<RouteCollection>) -> Self {
        Self {
            inner: StaticCollector::new(collections),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteCollector for SpyCollector {
    fn name(&self) -> &str {
        "spy"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.collect()
    }
}

/// The `article.show` route used across scenarios.
pub fn article_route() -> Route {
    Route::builder("article.show", "/articles/{slug}", "ArticleController::show")
        .rule(RouteRule::new("slug", r"[a-z0-9\-]+"))
        .build()
        .unwrap()
}

/// Route with a plain `{placeholder}` pattern and no constraints.
pub fn route(name: &str, path: &str) -> Route {
    Route::builder(name, path, format!("{}.action", name))
        .build()
        .unwrap()
}

/// Write `content` to a uniquely named file in the temp directory.
pub fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "route-engine-it-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, content).unwrap();
    path
}
