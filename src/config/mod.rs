//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks: patterns, regexes, names)
//!     → EngineConfig (validated, immutable)
//!     → schema builders produce RouteCollection values
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → ReloadableCollector swaps its snapshot atomically
//! ```
//!
//! # Design Decisions
//! - Route definitions are data; nothing in a route file is executed
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_route_file, ConfigError};
pub use schema::{
    CollectionConfig, DuplicateNamePolicy, EngineConfig, EngineSettings, RouteConfig, RouteFile,
    RuleConfig,
};
pub use validation::ValidationError;
