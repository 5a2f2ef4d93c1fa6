use portfolio_blog::{
    AuthError,
    auth::Identity,
    portfolio::{PortfolioAccess, generate_portfolio_key, key_matches},
    visibility::{authorize_item, check_visible, list_statuses},
};

fn statuses(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// --- List Statuses ---

#[test]
fn test_anonymous_lists_public_only_whatever_is_requested() {
    for requested in ["", "all", "internal", "public", "draft", "bogus"] {
        assert_eq!(
            list_statuses(false, requested),
            statuses(&["public"]),
            "requested {requested:?}"
        );
    }
}

#[test]
fn test_elevated_list_statuses() {
    assert_eq!(list_statuses(true, "internal"), statuses(&["internal"]));
    assert_eq!(list_statuses(true, "public"), statuses(&["public"]));
    assert_eq!(list_statuses(true, "all"), statuses(&["public", "internal"]));
    assert_eq!(list_statuses(true, ""), statuses(&["public", "internal"]));
}

#[test]
fn test_elevated_unknown_status_passes_through() {
    assert_eq!(list_statuses(true, "draft"), statuses(&["draft"]));
    assert_eq!(list_statuses(true, "archived"), statuses(&["archived"]));
}

// --- Single Item ---

#[test]
fn test_public_item_visible_to_everyone() {
    assert_eq!(check_visible("public", false), Ok(()));
    assert_eq!(check_visible("public", true), Ok(()));
}

#[test]
fn test_internal_item_requires_identity() {
    assert_eq!(check_visible("internal", false), Err(AuthError::AccessDenied));
    assert_eq!(check_visible("internal", true), Ok(()));
}

#[test]
fn test_draft_and_unknown_items_are_not_found() {
    for status in ["draft", "archived", ""] {
        assert_eq!(check_visible(status, false), Err(AuthError::NotFound));
        assert_eq!(check_visible(status, true), Err(AuthError::NotFound));
    }
}

#[test]
fn test_missing_item_is_not_found_even_with_identity() {
    let missing: Option<&str> = None;
    assert_eq!(authorize_item(missing, |s| *s, true), Err(AuthError::NotFound));
}

#[test]
fn test_authorize_item_returns_the_item() {
    assert_eq!(authorize_item(Some("internal"), |s| *s, true), Ok("internal"));
    assert_eq!(
        authorize_item(Some("internal"), |s| *s, false),
        Err(AuthError::AccessDenied)
    );
}

// --- Portfolio Key ---

const PROFILE_ID: i64 = 10;
const KEY: &str = "5f2b9c0d7e1a4b3c8d6e0f1a2b3c4d5e";

#[test]
fn test_owner_is_elevated_and_sees_key() {
    let owner = Identity {
        subject_id: PROFILE_ID,
    };
    let access = PortfolioAccess::evaluate(PROFILE_ID, Some(&owner), None, KEY);

    assert!(access.show_elevated_content);
    assert!(access.disclose_key);
}

#[test]
fn test_other_identity_is_elevated_without_key() {
    let other = Identity { subject_id: 99 };
    let access = PortfolioAccess::evaluate(PROFILE_ID, Some(&other), None, KEY);

    assert!(access.show_elevated_content);
    assert!(!access.disclose_key);
}

#[test]
fn test_anonymous_with_matching_key_is_elevated_without_key() {
    let access = PortfolioAccess::evaluate(PROFILE_ID, None, Some(KEY), KEY);

    assert_eq!(
        access,
        PortfolioAccess {
            show_elevated_content: true,
            disclose_key: false,
        }
    );
}

#[test]
fn test_anonymous_with_wrong_or_empty_key_is_not_elevated() {
    for supplied in [None, Some(""), Some("wrong"), Some(&KEY[..KEY.len() - 1])] {
        let access = PortfolioAccess::evaluate(PROFILE_ID, None, supplied, KEY);
        assert!(!access.show_elevated_content, "supplied {supplied:?}");
        assert!(!access.disclose_key);
    }
}

#[test]
fn test_key_match_is_exact() {
    let mut last_changed = KEY[..KEY.len() - 1].to_string();
    last_changed.push('f');

    assert!(key_matches(Some(KEY), KEY));
    assert!(!key_matches(Some(&last_changed), KEY));
    assert!(!key_matches(Some(&KEY.to_uppercase()), KEY));
    assert!(!key_matches(Some(&format!("{KEY}0")), KEY));
}

#[test]
fn test_empty_key_never_matches_empty_profile_key() {
    assert!(!key_matches(Some(""), ""));
    assert!(!key_matches(None, ""));
}

#[test]
fn test_generated_keys_are_32_hex_chars_and_distinct() {
    let a = generate_portfolio_key();
    let b = generate_portfolio_key();

    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(a, b);
}
