//! Collections produced by a closure on every lookup.

use std::sync::Arc;

use crate::collector::{BoxError, RouteCollector};
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Invokes `callback` each time the table is needed.
pub struct CallbackCollector<F> {
    name: String,
    callback: F,
}

impl<F> CallbackCollector<F>
where
    F: Fn() -> Result<Vec<RouteCollection>, BoxError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> std::fmt::Debug for CallbackCollector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackCollector")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> RouteCollector for CallbackCollector<F>
where
    F: Fn() -> Result<Vec<RouteCollection>, BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        let collections = (self.callback)().map_err(|e| CollectorError::failed(&self.name, e))?;
        Ok(collections.into_iter().map(Arc::new).collect())
    }
}
