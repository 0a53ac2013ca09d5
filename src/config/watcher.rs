//! Hot reload of a route table and the route files it lists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, load_route_file, ConfigError};
use crate::config::schema::EngineConfig;

/// Watches a configuration file and its route files, emitting each
/// configuration that loads and validates cleanly.
#[derive(Debug)]
pub struct ConfigWatcher {
    config_path: PathBuf,
    watched: Vec<PathBuf>,
    update_tx: mpsc::UnboundedSender<EngineConfig>,
}

impl ConfigWatcher {
    /// Watch `path`, plus the route files `current` refers to.
    pub fn new(path: &Path, current: &EngineConfig) -> (Self, mpsc::UnboundedReceiver<EngineConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let mut watched = vec![path.to_path_buf()];
        watched.extend(current.settings.route_files.iter().cloned());

        let watcher = Self {
            config_path: path.to_path_buf(),
            watched,
            update_tx,
        };
        (watcher, update_rx)
    }

    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// Route files added by a reload are not picked up until restart.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            config_path,
            watched: paths,
            update_tx,
        } = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    tracing::info!(paths = ?event.paths, "Route table change detected, reloading");
                    match reload(&config_path) {
                        Ok(config) => {
                            if update_tx.send(config).is_err() {
                                tracing::debug!("Route table receiver dropped");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Reload rejected; keeping current routes");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for path in &paths {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(files = paths.len(), "Route table watcher started");
        Ok(watcher)
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Load the configuration and check every route file it lists, so a broken
/// route file rejects the reload instead of failing later lookups.
pub fn reload(path: &Path) -> Result<EngineConfig, ConfigError> {
    let config = load_config(path)?;
    for file in &config.settings.route_files {
        load_route_file(file, &config.settings)?;
    }
    Ok(config)
}
