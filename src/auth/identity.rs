use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{auth::token::TokenCodec, error::AppError};

/// Name of the cookie that carries the identity token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Identity
///
/// The resolved subject of an authenticated request. Only a successful
/// `TokenCodec::verify` produces one, and it lives for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: i64,
}

/// MaybeIdentity
///
/// Outcome of identity resolution: `Some` for a verified credential, `None` for anonymous.
/// Handlers take it as an argument and pass it on to the visibility policy explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// extract_credential
///
/// Pulls the raw token out of the request headers.
///
/// A `token` cookie, when present, is the only place looked at: an empty value means no
/// credential, and the header is not consulted. Without the cookie the `Authorization`
/// header must be exactly `Bearer <token>`: two parts separated by a single space. Any
/// other header shape means "no credential", not an error.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    match cookie_value(headers, TOKEN_COOKIE_NAME) {
        Some(value) => Some(value).filter(|value| !value.is_empty()),
        None => bearer_token(headers),
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| unquote(value.trim()))
}

// `"abc"` becomes `abc`; only one surrounding pair is removed.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// resolve_identity
///
/// Extracts and verifies the request credential. Never fails: a missing, malformed,
/// expired, or forged credential all resolve to `None` and the request continues
/// as anonymous.
pub fn resolve_identity(headers: &HeaderMap, codec: &TokenCodec) -> Option<Identity> {
    let token = extract_credential(headers)?;

    match codec.verify(token) {
        Ok(subject_id) => Some(Identity { subject_id }),
        Err(e) => {
            tracing::debug!(error = %e, "credential ignored, continuing as anonymous");
            None
        }
    }
}

/// identity_middleware
///
/// Runs identity resolution once per request and stores the result in the request
/// extensions for the `MaybeIdentity` and `Identity` extractors. It never rejects.
pub async fn identity_middleware(
    State(codec): State<TokenCodec>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(request.headers(), &codec);
    if let Some(Identity { subject_id }) = identity {
        tracing::debug!(subject_id, "request authenticated");
    }

    request.extensions_mut().insert(MaybeIdentity(identity));
    next.run(request).await
}

/// Reads the identity resolved by `identity_middleware`. When the middleware is not
/// installed on the route, resolution happens here instead, so the extractor never fails.
impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<MaybeIdentity>() {
            return Ok(*resolved);
        }

        let codec = TokenCodec::from_ref(state);
        Ok(MaybeIdentity(resolve_identity(&parts.headers, &codec)))
    }
}

/// Strict variant used by routes that cannot serve anonymous callers.
///
/// Rejection: `AppError::Unauthorized` (401).
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeIdentity(identity) = match MaybeIdentity::from_request_parts(parts, state).await {
            Ok(resolved) => resolved,
            Err(never) => match never {},
        };

        identity.ok_or(AppError::Unauthorized)
    }
}
