//! Route definition, compilation and matching engine.

pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use collector::RouteCollector;
pub use config::EngineConfig;
pub use error::{CollectorError, ConfigurationError, RoutingError, RoutingResult};
pub use routing::{Route, RouteCollection, RouteMatch, RouteRule, Router};
