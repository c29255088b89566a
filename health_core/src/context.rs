//! Request-scoped authorization outcome.
//!
//! An upstream middleware records whether the caller authenticated; the health handler
//! reads it to decide whether per-check detail may be disclosed. The value lives in the
//! request's extensions under a crate-private key type, so nothing outside this module
//! can forge or shadow it.

use axum::http::{Extensions, Request};

#[derive(Debug, Clone, Copy)]
struct AuthenticationSuccess(bool);

/// Returns the request carrying `value` as its authorization outcome.
pub fn with_auth_result<B>(mut request: Request<B>, value: bool) -> Request<B> {
    set_auth_result(request.extensions_mut(), value);
    request
}

/// Same as [`with_auth_result`] for middlewares that only hold the extensions.
pub fn set_auth_result(extensions: &mut Extensions, value: bool) {
    extensions.insert(AuthenticationSuccess(value));
}

/// `None` means no authorization decision was made for this request.
pub fn auth_result(extensions: &Extensions) -> Option<bool> {
    extensions.get::<AuthenticationSuccess>().map(|result| result.0)
}
