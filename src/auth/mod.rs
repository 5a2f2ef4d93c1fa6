//! Optional authentication.
//!
//! `token` signs and verifies identity tokens, `identity` turns a request's cookie or
//! bearer header into `Option<Identity>` without ever failing the request, and
//! `password` is the opaque derive/verify capability used by sign-up and login.

pub mod identity;
pub mod password;
pub mod token;

pub use identity::{
    Identity, MaybeIdentity, TOKEN_COOKIE_NAME, extract_credential, identity_middleware,
    resolve_identity,
};
pub use token::{Claims, TOKEN_VALIDITY_HOURS, TokenCodec};
