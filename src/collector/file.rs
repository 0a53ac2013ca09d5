//! Route files read from disk on every lookup.

use std::path::PathBuf;
use std::sync::Arc;

use crate::collector::RouteCollector;
use crate::config::{load_route_file, EngineSettings};
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Loads TOML route files in order. Edits are visible on the next lookup.
#[derive(Debug, Clone)]
pub struct FileCollector {
    paths: Vec<PathBuf>,
    settings: EngineSettings,
}

impl FileCollector {
    pub fn new(paths: Vec<PathBuf>, settings: EngineSettings) -> Self {
        Self { paths, settings }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl RouteCollector for FileCollector {
    fn name(&self) -> &str {
        "file"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        let mut collections = Vec::new();

        for path in &self.paths {
            let failed = |e: Box<dyn std::error::Error + Send + Sync>| {
                CollectorError::failed(format!("file:{}", path.display()), e)
            };

            let file = load_route_file(path, &self.settings).map_err(|e| failed(e.into()))?;
            let built = file.build_collections().map_err(|e| failed(e.into()))?;
            collections.extend(built.into_iter().map(Arc::new));
        }

        Ok(collections)
    }
}
