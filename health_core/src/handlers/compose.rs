//! Composition of the health handler with its middleware chain

use crate::{
    handlers::{encoder::ResultEncoder, health::HealthCheckHandler},
    health::Checker,
    middleware::{HealthService, Middleware},
};
use axum::{extract::Request, response::Response};
use std::{
    convert::Infallible,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;
use tracing::info;

/// Lifecycle control over the probe engine behind a composed handler.
pub trait PeriodicChecks {
    fn start_periodic_checks(&self);
    fn stop_periodic_checks(&self);
}

/// The composed health endpoint.
///
/// Serves requests through the middleware chain and forwards lifecycle calls to the
/// probe engine, however many layers wrap the inner handler. Cloning is cheap and all
/// clones share the same engine.
#[derive(Clone)]
pub struct Handler {
    service: HealthService,
    checker: Arc<dyn Checker>,
}

impl Handler {
    pub fn builder(checker: Arc<dyn Checker>) -> HandlerBuilder {
        HandlerBuilder::new(checker)
    }
}

impl PeriodicChecks for Handler {
    fn start_periodic_checks(&self) {
        self.checker.start_periodic_checks();
    }

    fn stop_periodic_checks(&self) {
        self.checker.stop_periodic_checks();
    }
}

impl Service<Request> for Handler {
    type Response = Response;
    type Error = Infallible;
    type Future = <HealthService as Service<Request>>::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

pub struct HandlerBuilder {
    checker: Arc<dyn Checker>,
    middlewares: Vec<Middleware>,
    encoder: Option<Arc<dyn ResultEncoder>>,
}

impl HandlerBuilder {
    pub fn new(checker: Arc<dyn Checker>) -> Self {
        Self {
            checker,
            middlewares: Vec::new(),
            encoder: None,
        }
    }

    /// Appends a middleware. Earlier middlewares wrap later ones.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn middlewares<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn ResultEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn build(self) -> Handler {
        let mut base = HealthCheckHandler::new(self.checker.clone());
        if let Some(encoder) = self.encoder {
            base = base.with_encoder(encoder);
        }

        let names: Vec<&str> = self.middlewares.iter().map(Middleware::name).collect();
        info!("Composing health handler with middlewares {:?}", names);

        // Wrap from the innermost layer outwards so the first middleware ends up outermost.
        let service = self
            .middlewares
            .into_iter()
            .rev()
            .fold(HealthService::new(base), |inner, middleware| middleware.wrap(inner));

        Handler {
            service,
            checker: self.checker,
        }
    }
}

/// Builds the health endpoint around `checker`; `middlewares[0]` is the outermost layer.
pub fn new_handler(checker: Arc<dyn Checker>, middlewares: Vec<Middleware>) -> Handler {
    HandlerBuilder::new(checker).middlewares(middlewares).build()
}

/// Starts periodic probing if the engine is configured for it and not already running.
pub fn start_periodic_checks<H: PeriodicChecks>(handler: &H) {
    handler.start_periodic_checks();
}

/// Signals periodic probing to stop. Returns before in-flight checks have finished.
pub fn stop_periodic_checks<H: PeriodicChecks>(handler: &H) {
    handler.stop_periodic_checks();
}
