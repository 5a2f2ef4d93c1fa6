/// Router Module Index
///
/// Routes are split by whether they can serve anonymous callers. Identity resolution
/// runs in front of both; only the authenticated table rejects anonymous requests.

/// Routes open to everyone. Handlers receive `MaybeIdentity` and apply the
/// visibility policy themselves.
pub mod public;

/// Routes that require a verified identity.
pub mod authenticated;
