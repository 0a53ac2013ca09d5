//! Message-driven route collection.
//!
//! A [`CollectRoutes`] message is dispatched to every subscribed provider in
//! subscription order; each provider appends the collections it owns.
//! Modules can contribute routes without the router knowing about them.

use std::sync::Arc;

use crate::collector::{BoxError, RouteCollector};
use crate::error::CollectorError;
use crate::routing::RouteCollection;

/// Message passed to providers during collection.
#[derive(Debug, Default)]
pub struct CollectRoutes {
    collections: Vec<RouteCollection>,
}

impl CollectRoutes {
    pub fn add(&mut self, collection: RouteCollection) {
        self.collections.push(collection);
    }

    pub fn collections(&self) -> &[RouteCollection] {
        &self.collections
    }
}

/// Subscriber that answers [`CollectRoutes`].
pub trait RouteProvider: Send + Sync {
    fn provide(&self, message: &mut CollectRoutes) -> Result<(), BoxError>;
}

impl<F> RouteProvider for F
where
    F: Fn(&mut CollectRoutes) -> Result<(), BoxError> + Send + Sync,
{
    fn provide(&self, message: &mut CollectRoutes) -> Result<(), BoxError> {
        self(message)
    }
}

/// Dispatches [`CollectRoutes`] to its providers on every lookup.
#[derive(Default)]
pub struct MessageCollector {
    providers: Vec<(String, Box<dyn RouteProvider>)>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a diagnostic name.
    pub fn subscribe(&mut self, name: impl Into<String>, provider: impl RouteProvider + 'static) {
        self.providers.push((name.into(), Box::new(provider)));
    }

    pub fn with_provider(mut self, name: impl Into<String>, provider: impl RouteProvider + 'static) -> Self {
        self.subscribe(name, provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

impl std::fmt::Debug for MessageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCollector")
            .field("providers", &self.providers.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

impl RouteCollector for MessageCollector {
    fn name(&self) -> &str {
        "message"
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        let mut message = CollectRoutes::default();
        for (name, provider) in &self.providers {
            provider
                .provide(&mut message)
                .map_err(|e| CollectorError::failed(format!("message:{}", name), e))?;
        }

        tracing::trace!(
            providers = self.providers.len(),
            collections = message.collections.len(),
            "Collected routes from providers"
        );
        Ok(message.collections.into_iter().map(Arc::new).collect())
    }
}
