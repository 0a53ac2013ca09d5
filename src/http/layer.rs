//! Tower middleware that resolves routes for incoming HTTP requests.
//!
//! # Responsibilities
//! - Match each request against the route table (method, host, scheme, path)
//! - Attach the [`RouteMatch`] to request extensions for downstream handlers
//! - Short-circuit lookup misses with `404 Not Found`
//! - Short-circuit configuration or collector failures with `500`
//!
//! # Design Decisions
//! - Resolution runs inline in `call`; collectors that block should cache
//! - The inner service is only invoked for matched requests

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::collector::RouteCollector;
use crate::routing::{RouteMatch, Router};

/// Wraps services with route resolution.
#[derive(Debug)]
pub struct RouteLayer<C> {
    router: Arc<Router<C>>,
}

impl<C> RouteLayer<C> {
    pub fn new(router: Arc<Router<C>>) -> Self {
        Self { router }
    }
}

impl<C> Clone for RouteLayer<C> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<S, C> Layer<S> for RouteLayer<C> {
    type Service = RouteService<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        RouteService {
            inner,
            router: Arc::clone(&self.router),
        }
    }
}

/// Service produced by [`RouteLayer`].
#[derive(Debug)]
pub struct RouteService<S, C> {
    inner: S,
    router: Arc<Router<C>>,
}

impl<S: Clone, C> Clone for RouteService<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            router: Arc::clone(&self.router),
        }
    }
}

impl<S, C> Service<Request<Body>> for RouteService<S, C>
where
    S: Service<Request<Body>, Response = Response>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    C: RouteCollector,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        match self.router.match_request(&request) {
            Ok(found) => {
                request.extensions_mut().insert::<RouteMatch>(found);
                Box::pin(self.inner.call(request))
            }
            Err(e) if e.is_lookup_miss() => {
                let response = (StatusCode::NOT_FOUND, "No matching route found").into_response();
                Box::pin(async move { Ok(response) })
            }
            Err(e) => {
                tracing::error!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    error = %e,
                    "Route resolution failed"
                );
                let response = (StatusCode::INTERNAL_SERVER_ERROR, "Route resolution failed").into_response();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    use crate::collector::{CallbackCollector, StaticCollector};
    use crate::routing::{Route, RouteCollection, RouteRule};

    async fn echo_route(request: Request<Body>) -> Result<Response, Infallible> {
        let body = request
            .extensions()
            .get::<RouteMatch>()
            .map(|found| {
                format!(
                    "{}:{}",
                    found.route().name(),
                    found.parameter("slug").unwrap_or("-")
                )
            })
            .unwrap_or_default();
        Ok(body.into_response())
    }

    fn article_router() -> Arc<Router<StaticCollector>> {
        let route = Route::builder("article.show", "/articles/{slug}", "ArticleController::show")
            .rule(RouteRule::new("slug", r"[a-z0-9\-]+"))
            .method("GET")
            .build()
            .unwrap();
        Arc::new(Router::new(StaticCollector::new(vec![
            RouteCollection::new("articles").with_route(route)
        ])))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_match_attached_to_extensions() {
        let service = RouteLayer::new(article_router()).layer(service_fn(echo_route));
        let request = Request::builder()
            .uri("/articles/hello-world")
            .body(Body::empty())
            .unwrap();

        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "article.show:hello-world");
    }

    #[tokio::test]
    async fn test_miss_returns_not_found() {
        let service = RouteLayer::new(article_router()).layer(service_fn(echo_route));

        let request = Request::builder()
            .uri("/articles/Hello_World")
            .body(Body::empty())
            .unwrap();
        let response = service.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = Request::builder()
            .method("POST")
            .uri("/articles/hello-world")
            .body(Body::empty())
            .unwrap();
        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_collector_failure_returns_server_error() {
        let router = Arc::new(Router::new(CallbackCollector::new("callback:down", || {
            Err("unavailable".into())
        })));
        let service = RouteLayer::new(router).layer(service_fn(echo_route));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
