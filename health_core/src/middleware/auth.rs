//! Middlewares that record an authorization outcome for the health handler

use super::Middleware;
use crate::context::with_auth_result;
use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

#[derive(Clone)]
struct BearerAuth {
    token: Arc<str>,
    reject_unauthenticated: bool,
}

/// Marks requests presenting `Authorization: Bearer <token>` as authenticated and all
/// others as not authenticated. With `reject_unauthenticated` the latter get a bare
/// `401` instead of a detail-free health response.
pub fn bearer_auth(token: impl Into<String>, reject_unauthenticated: bool) -> Middleware {
    let state = BearerAuth {
        token: Arc::from(token.into()),
        reject_unauthenticated,
    };
    Middleware::from_layer(
        "bearer_auth",
        axum_middleware::from_fn_with_state(state, bearer_auth_middleware),
    )
}

async fn bearer_auth_middleware(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = extract_token_from_header(request.headers())
        .map(|token| token == auth.token.as_ref())
        .unwrap_or(false);

    if !authenticated && auth.reject_unauthenticated {
        warn!("Rejecting unauthenticated health request to {}", request.uri().path());
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    next.run(with_auth_result(request, authenticated)).await
}

type AuthPredicate = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Records whatever `predicate` decides for the request.
pub fn custom_auth<F>(predicate: F) -> Middleware
where
    F: Fn(&Request) -> bool + Send + Sync + 'static,
{
    let predicate: AuthPredicate = Arc::new(predicate);
    Middleware::from_layer(
        "custom_auth",
        axum_middleware::from_fn_with_state(predicate, custom_auth_middleware),
    )
}

async fn custom_auth_middleware(
    State(predicate): State<AuthPredicate>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = predicate(&request);
    next.run(with_auth_result(request, authenticated)).await
}

/// Hides per-check detail unless the query string carries `param`.
///
/// Keys and values are percent-decoded. `param=false` and `param=0` count as absent;
/// any other value, including none at all (`?full`), asks for detail. Requests that do
/// ask keep whatever outcome an outer middleware recorded.
pub fn full_details_on_query_param(param: impl Into<String>) -> Middleware {
    let param: Arc<str> = Arc::from(param.into());
    Middleware::from_layer(
        "full_details_on_query_param",
        axum_middleware::from_fn_with_state(param, query_param_middleware),
    )
}

async fn query_param_middleware(
    State(param): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    if requests_full_details(request.uri(), &param) {
        return next.run(request).await;
    }

    debug!("Query parameter '{}' absent, hiding check details", param);
    next.run(with_auth_result(request, false)).await
}

fn requests_full_details(uri: &Uri, param: &str) -> bool {
    let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(uri) else {
        return false;
    };

    params
        .get(param)
        .is_some_and(|value| !matches!(value.as_str(), "false" | "0"))
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}
