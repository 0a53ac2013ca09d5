//! Concatenation of several collectors.

use std::sync::Arc;

use crate::collector::RouteCollector;
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Asks each collector in turn; the first failure fails the whole enumeration.
#[derive(Default)]
pub struct ChainCollector {
    collectors: Vec<Box<dyn RouteCollector>>,
}

impl ChainCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collector: impl RouteCollector + 'static) -> Self {
        self.collectors.push(Box::new(collector));
        self
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for ChainCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.collectors.iter().map(|c| c.name()))
            .finish()
    }
}

impl RouteCollector for ChainCollector {
    fn name(&self) -> &str {
        "chain"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        let mut collections = Vec::new();
        for collector in &self.collectors {
            collections.extend(collector.collect()?);
        }
        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CallbackCollector, StaticCollector};

    #[test]
    fn test_chain_order() {
        let chain = ChainCollector::new()
            .with(StaticCollector::new(vec![RouteCollection::new("a")]))
            .with(StaticCollector::new(vec![
                RouteCollection::new("b"),
                RouteCollection::new("c"),
            ]));

        let ids: Vec<_> = chain
            .collect()
            .unwrap()
            .iter()
            .map(|c| c.identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_fails_whole_enumeration() {
        let chain = ChainCollector::new()
            .with(StaticCollector::new(vec![RouteCollection::new("a")]))
            .with(CallbackCollector::new("callback:down", || Err("unavailable".into())));

        assert_eq!(chain.collect().unwrap_err().collector(), "callback:down");
    }
}
