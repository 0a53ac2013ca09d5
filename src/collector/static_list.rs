//! Collections fixed at construction time.

use std::sync::Arc;

use crate::collector::RouteCollector;
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Returns the same collections on every lookup.
#[derive(Debug, Clone, Default)]
pub struct StaticCollector {
    collections: Vec<Arc<RouteCollection>>,
}

impl StaticCollector {
    pub fn new(collections: Vec<RouteCollection>) -> Self {
        Self {
            collections: collections.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn push(&mut self, collection: RouteCollection) {
        self.collections.push(Arc::new(collection));
    }
}

impl RouteCollector for StaticCollector {
    fn name(&self) -> &str {
        "static"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        Ok(self.collections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_collect_preserves_order() {
        let mut collector = StaticCollector::new(vec![RouteCollection::new("first")]);
        collector.push(RouteCollection::new("second"));

        let ids: Vec<_> = collector
            .collect()
            .unwrap()
            .iter()
            .map(|c| c.identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
