//! Health request handler

use crate::{
    context::auth_result,
    handlers::encoder::{JsonEncoder, ResultEncoder},
    health::Checker,
    status::map_http_status,
};
use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;
use tracing::debug;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Turns a request into the aggregated health response.
///
/// Per-check detail is hidden only when an upstream middleware recorded an explicit
/// negative authorization outcome; a missing outcome discloses detail.
#[derive(Clone)]
pub struct HealthCheckHandler {
    checker: Arc<dyn Checker>,
    encoder: Arc<dyn ResultEncoder>,
}

impl HealthCheckHandler {
    pub fn new(checker: Arc<dyn Checker>) -> Self {
        Self {
            checker,
            encoder: Arc::new(JsonEncoder),
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ResultEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub async fn handle(&self, request: Request) -> Response {
        let include_details = auth_result(request.extensions()) != Some(false);
        drop(request);

        let result = self.checker.check(include_details).await;

        let body = match self.encoder.encode(&result) {
            Ok(body) => body,
            Err(e) => return e.into_response(),
        };

        debug!(status = %result.status, include_details, "Serving health result");

        let mut response = Response::new(Body::from(body));
        disable_response_cache(response.headers_mut());
        *response.status_mut() = map_http_status(result.status);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        response
    }
}

impl Service<Request> for HealthCheckHandler {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}

/// Health responses must never be served from a cache: a stale verdict can make an
/// orchestrator route to, or evacuate, a node based on outdated information.
pub fn disable_response_cache(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("-1"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_response_cache() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=3600"));

        disable_response_cache(&mut headers);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[EXPIRES], "-1");
    }
}
