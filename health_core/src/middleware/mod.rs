//! Middleware for the health endpoint.
//!
//! A [`Middleware`] turns one request-serving service into another. Any
//! [`tower::Layer`] whose service keeps the request/response types qualifies,
//! including `axum::middleware::from_fn` layers.

pub mod auth;
pub mod logging;

pub use auth::{bearer_auth, custom_auth, full_details_on_query_param};
pub use logging::{request_logger, trace_layer};

use axum::{extract::Request, response::Response};
use std::convert::Infallible;
use tower::{util::BoxCloneService, Layer, Service};

/// Type-erased request-serving unit every middleware receives and returns.
pub type HealthService = BoxCloneService<Request, Response, Infallible>;

pub struct Middleware {
    name: &'static str,
    wrap: Box<dyn FnOnce(HealthService) -> HealthService + Send>,
}

impl Middleware {
    pub fn new<F>(name: &'static str, wrap: F) -> Self
    where
        F: FnOnce(HealthService) -> HealthService + Send + 'static,
    {
        Self {
            name,
            wrap: Box::new(wrap),
        }
    }

    pub fn from_layer<L>(name: &'static str, layer: L) -> Self
    where
        L: Layer<HealthService> + Send + 'static,
        L::Service: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self::new(name, move |inner| BoxCloneService::new(layer.layer(inner)))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn wrap(self, inner: HealthService) -> HealthService {
        (self.wrap)(inner)
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware").field("name", &self.name).finish()
    }
}
