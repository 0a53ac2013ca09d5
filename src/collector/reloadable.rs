//! Hot-swappable route table.
//!
//! # Design Decisions
//! - Readers load the current snapshot without locking (`arc-swap`)
//! - A reload replaces the whole snapshot; lookups see either the old or
//!   the new table, never a mix
//! - A reload that fails to build keeps the previous snapshot

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::collector::RouteCollector;
use crate::config::EngineConfig;
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Serves the most recently installed set of collections.
#[derive(Debug)]
pub struct ReloadableCollector {
    current: ArcSwap<Vec<Arc<RouteCollection>>>,
}

impl ReloadableCollector {
    pub fn new(collections: Vec<RouteCollection>) -> Self {
        Self {
            current: ArcSwap::from_pointee(wrap(collections)),
        }
    }

    /// Install a new table.
    pub fn replace(&self, collections: Vec<RouteCollection>) {
        let collections = wrap(collections);
        tracing::info!(collections = collections.len(), "Route table replaced");
        self.current.store(Arc::new(collections));
    }

    /// The table currently being served.
    pub fn snapshot(&self) -> Arc<Vec<Arc<RouteCollection>>> {
        self.current.load_full()
    }

    /// Apply configurations from `updates` (typically a
    /// [`ConfigWatcher`](crate::config::watcher::ConfigWatcher)) until the
    /// sender is dropped.
    pub fn follow(self: Arc<Self>, mut updates: mpsc::UnboundedReceiver<EngineConfig>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                match config.build_collections() {
                    Ok(collections) => self.replace(collections),
                    Err(e) => {
                        tracing::error!(error = %e, "Reloaded route table is unusable; keeping current routes");
                    }
                }
            }
            tracing::debug!("Route table update channel closed");
        })
    }
}

fn wrap(collections: Vec<RouteCollection>) -> Vec<Arc<RouteCollection>> {
    collections.into_iter().map(Arc::new).collect()
}

impl RouteCollector for ReloadableCollector {
    fn name(&self) -> &str {
        "reloadable"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        Ok(Vec::clone(&self.current.load()))
    }
}
