//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! generator / router / collectors produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → whatever subscriber / recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics recorder; the facade is a no-op until one exists
//! - The binary installs the log subscriber; the library only emits events

pub mod logging;
pub mod metrics;
