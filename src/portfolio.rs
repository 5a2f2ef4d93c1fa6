use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::Identity;

/// Generates a fresh portfolio key for a new account.
///
/// 128 random bits rendered as 32 lowercase hex characters. The key never changes
/// for the lifetime of the account.
pub fn generate_portfolio_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// PortfolioAccess
///
/// What a caller may see on one profile page.
///
/// `show_elevated_content` unlocks the `internal` tier of *this profile's* articles,
/// either through any verified identity or through the profile's own portfolio key.
/// `disclose_key` is decided independently: only the authenticated owner ever gets the
/// key back, and presenting the key never discloses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortfolioAccess {
    pub show_elevated_content: bool,
    pub disclose_key: bool,
}

impl PortfolioAccess {
    pub fn evaluate(
        profile_id: i64,
        identity: Option<&Identity>,
        supplied_key: Option<&str>,
        actual_key: &str,
    ) -> Self {
        let show_elevated_content = identity.is_some() || key_matches(supplied_key, actual_key);
        let disclose_key = identity.is_some_and(|id| id.subject_id == profile_id);

        Self {
            show_elevated_content,
            disclose_key,
        }
    }
}

/// True when a non-empty supplied key equals the profile's key. Compared in constant time.
pub fn key_matches(supplied_key: Option<&str>, actual_key: &str) -> bool {
    match supplied_key {
        Some(supplied) if !supplied.is_empty() => {
            bool::from(supplied.as_bytes().ct_eq(actual_key.as_bytes()))
        }
        _ => false,
    }
}
