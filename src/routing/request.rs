//! Request-side view consumed by the matchers.
//!
//! # Design Decisions
//! - The engine never parses HTTP; it reads four attributes through traits
//! - `http::Request<B>` implements them directly (host from URI authority,
//!   else the Host header; scheme from the URI, else `http`)
//! - Ports are stripped from hostnames before constraint tests

use axum::http::{header, Request};

/// Anything with a path can be matched by the basic matcher.
pub trait RouteRequest {
    fn path(&self) -> &str;
}

/// Requests that can also be tested against method/host/scheme constraints.
pub trait HttpRouteRequest: RouteRequest {
    fn method(&self) -> &str;
    fn hostname(&self) -> &str;
    fn scheme(&self) -> &str;
}

impl RouteRequest for str {
    fn path(&self) -> &str {
        self
    }
}

impl RouteRequest for String {
    fn path(&self) -> &str {
        self
    }
}

/// Owned request attributes, for callers that do not hold an `http::Request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    method: String,
    hostname: String,
    scheme: String,
    path: String,
}

impl RequestParts {
    /// A `GET http://<no host><path>` request.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            hostname: String::new(),
            scheme: "http".to_string(),
            path: path.into(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Copy the routing attributes out of an `http::Request`.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: HttpRouteRequest::method(request).to_string(),
            hostname: HttpRouteRequest::hostname(request).to_string(),
            scheme: HttpRouteRequest::scheme(request).to_string(),
            path: RouteRequest::path(request).to_string(),
        }
    }
}

impl RouteRequest for RequestParts {
    fn path(&self) -> &str {
        &self.path
    }
}

impl HttpRouteRequest for RequestParts {
    fn method(&self) -> &str {
        &self.method
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl<B> RouteRequest for Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }
}

impl<B> HttpRouteRequest for Request<B> {
    fn method(&self) -> &str {
        self.method().as_str()
    }

    fn hostname(&self) -> &str {
        let host = self.uri().host().or_else(|| {
            self.headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
        });
        host.map(strip_port).unwrap_or("")
    }

    fn scheme(&self) -> &str {
        self.uri().scheme_str().unwrap_or("http")
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.split_once(':') {
        Some((name, _)) => name,
        None => host,
    }
}
