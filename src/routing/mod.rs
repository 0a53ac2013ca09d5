//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, host, scheme, path)
//!     → router.rs (collector enumeration, first-match search)
//!     → matcher.rs (collection prefix pre-check, constraint gating)
//!     → generator.rs (compiled pattern, built once per route)
//!     → Return: RouteMatch { route, parameters } or NoMatchingRoute
//!
//! Route definition (at table build time):
//!     path pattern + rules
//!     → pattern.rs (tokenize into literal/placeholder segments)
//!     → route.rs (immutable Route with identity)
//!     → collection.rs (ordered, optionally prefix-scoped group)
//! ```
//!
//! # Design Decisions
//! - Routes, rules and collections are immutable and shared via `Arc`
//! - Deterministic: same table and request always match the same route
//! - First match wins, in declaration order
//! - The prefix pre-check is the only index; no trie

pub mod collection;
pub mod generator;
pub mod matcher;
pub mod pattern;
pub mod request;
pub mod route;
pub mod router;
pub mod rule;

pub use collection::RouteCollection;
pub use generator::{CompiledPattern, PathRegexGenerator};
pub use matcher::{BasicRouteMatcher, HttpRouteMatcher, MatchOutcome, RouteMatcher, RouteParameters};
pub use request::{HttpRouteRequest, RequestParts, RouteRequest};
pub use route::{PatternKey, Route, RouteBuilder};
pub use router::{RouteMatch, RouteTableSummary, Router, RouterOptions};
pub use rule::RouteRule;
