//! Content visibility policy.
//!
//! Articles carry one of three tiers, ordered by increasing exposure:
//! `draft` < `internal` < `public`. Anonymous callers see `public` only; any verified
//! identity additionally sees `internal` across every author. `draft` never leaves the
//! single-item read path.
//!
//! Both functions are pure. The caller decides elevation (an identity, or a matching
//! portfolio key for one profile) and passes it in.

use crate::error::AuthError;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_INTERNAL: &str = "internal";
pub const STATUS_PUBLIC: &str = "public";

/// Filter value asking for every tier the caller may list.
pub const FILTER_ALL: &str = "all";

/// list_statuses
///
/// Resolves the set of statuses a list query may include.
///
/// | elevated | requested          | result               |
/// |----------|--------------------|----------------------|
/// | false    | (ignored)          | `public`             |
/// | true     | `internal`         | `internal`           |
/// | true     | `public`           | `public`             |
/// | true     | `all` or empty     | `public`, `internal` |
/// | true     | anything else      | the requested value  |
///
/// The last row passes an arbitrary status through for elevated callers, `draft`
/// included. The single-item check below never shows drafts, so the two paths
/// disagree for `draft`; both behaviours are kept as they are.
pub fn list_statuses(elevated: bool, requested: &str) -> Vec<String> {
    if !elevated {
        return vec![STATUS_PUBLIC.to_string()];
    }

    match requested {
        STATUS_INTERNAL => vec![STATUS_INTERNAL.to_string()],
        STATUS_PUBLIC => vec![STATUS_PUBLIC.to_string()],
        FILTER_ALL | "" => vec![STATUS_PUBLIC.to_string(), STATUS_INTERNAL.to_string()],
        other => vec![other.to_string()],
    }
}

/// check_visible
///
/// Decides whether a single, existing item with `status` may be shown.
///
/// - `public`: always.
/// - `internal`: only with an identity, otherwise `AccessDenied` ("login required").
/// - anything else: `NotFound`, indistinguishable from an absent item.
pub fn check_visible(status: &str, identity_present: bool) -> Result<(), AuthError> {
    match status {
        STATUS_PUBLIC => Ok(()),
        STATUS_INTERNAL if identity_present => Ok(()),
        STATUS_INTERNAL => Err(AuthError::AccessDenied),
        _ => Err(AuthError::NotFound),
    }
}

/// authorize_item
///
/// Applies the existence check and then `check_visible` to a looked-up item. A missing
/// item is always `NotFound`, whatever the identity.
pub fn authorize_item<T>(
    item: Option<T>,
    status_of: impl FnOnce(&T) -> &str,
    identity_present: bool,
) -> Result<T, AuthError> {
    let item = item.ok_or(AuthError::NotFound)?;
    check_visible(status_of(&item), identity_present)?;
    Ok(item)
}
