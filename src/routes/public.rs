use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without logging in. What they return still depends on the
/// caller: article reads go through the visibility policy with the resolved identity.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // --- Account ---
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        // Clears the cookie only. Works whether or not the caller is logged in.
        .route("/api/auth/logout", post(handlers::logout))
        // --- Articles ---
        // GET /api/articles?page=&limit=&department=&status=
        // Anonymous callers get `public` only, whatever `status` says.
        .route("/api/articles", get(handlers::list_articles))
        // GET /api/articles/{slug}
        // 401 LOGIN_REQUIRED for internal articles, 404 for drafts and unknown slugs.
        .route("/api/articles/{slug}", get(handlers::get_article))
        // --- Profiles ---
        // GET /api/users/{id}?portfolio_key=
        .route("/api/users/{id}", get(handlers::get_user_detail))
}
