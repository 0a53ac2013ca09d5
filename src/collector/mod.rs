//! Route collection subsystem.
//!
//! # Data Flow
//! ```text
//! Router lookup
//!     → RouteCollector::collect()
//!         - static_list.rs (fixed collections built in code)
//!         - callback.rs (closure invoked per lookup)
//!         - message.rs (CollectRoutes message dispatched to providers)
//!         - file.rs (TOML route files read per lookup)
//!         - reloadable.rs (atomic snapshot swapped by the config watcher)
//!         - chain.rs (concatenation of the above, in order)
//!     → Vec<Arc<RouteCollection>> in match-priority order
//! ```
//!
//! # Design Decisions
//! - Collectors own their collections; the router only borrows them per lookup
//! - Any failure is wrapped with the collector's name and fails the lookup
//! - Collectors are `Send + Sync` so one router can serve many threads

use std::sync::Arc;

use crate::error::CollectorError;
use crate::routing::RouteCollection;

pub mod callback;
pub mod chain;
pub mod file;
pub mod message;
pub mod reloadable;
pub mod static_list;

pub use callback::CallbackCollector;
pub use chain::ChainCollector;
pub use file::FileCollector;
pub use message::{CollectRoutes, MessageCollector, RouteProvider};
pub use reloadable::ReloadableCollector;
pub use static_list::StaticCollector;

/// Boxed error type accepted from user-supplied collectors and providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies the route table, one collection at a time, in priority order.
pub trait RouteCollector: Send + Sync {
    /// Diagnostic name used when wrapping failures.
    fn name(&self) -> &str;

    /// Enumerate the collections to search.
    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError>;
}

impl<T: RouteCollector + ?Sized> RouteCollector for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        (**self).collect()
    }
}

impl<T: RouteCollector + ?Sized> RouteCollector for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn collect(&self) -> Result<Vec<Arc<RouteCollection>>, CollectorError> {
        (**self).collect()
    }
}
