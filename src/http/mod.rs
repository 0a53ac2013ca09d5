//! HTTP integration.
//!
//! # Data Flow
//! ```text
//! http::Request<Body>
//!     → layer.rs (RouteService: resolve via Router + HttpRouteMatcher)
//!     → matched: RouteMatch inserted into extensions → inner service
//!     → miss: 404, failure: 500
//! ```

pub mod layer;

pub use layer::{RouteLayer, RouteService};
