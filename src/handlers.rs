use crate::{
    AppState,
    auth::{Identity, MaybeIdentity, TOKEN_COOKIE_NAME, TOKEN_VALIDITY_HOURS, password},
    config::AppConfig,
    error::AppError,
    models::{
        ArticleListResponse, ArticleResponse, AuthResponse, LoginRequest, MessageResponse,
        NewUser, SignUpRequest, UserDetailResponse, UserResponse,
    },
    portfolio::{self, PortfolioAccess},
    repository::{ArticleQuery, RepoError},
    visibility,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;
const MIN_PASSWORD_LEN: usize = 8;
const AFFILIATIONS: [&str; 3] = ["Dev", "MKT", "Ops"];

// --- Query Structs ---

/// ArticleListParams
///
/// Query parameters for `GET /api/articles`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleListParams {
    /// Page number, 1-based. Anything else, non-numeric included, means 1.
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Page size, 1..=100. Anything else, non-numeric included, means 10.
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// Only articles of this department.
    pub department: Option<String>,
    /// Requested status: `internal`, `public` or `all`. Ignored for anonymous callers.
    pub status: Option<String>,
}

/// PortfolioParams
///
/// Query parameters for `GET /api/users/{id}`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PortfolioParams {
    /// The profile's portfolio key. Unlocks its internal articles without logging in.
    pub portfolio_key: Option<String>,
}

// --- Article Handlers ---

/// list_articles
///
/// [Public Route] Lists articles, newest first, with pagination and filters.
///
/// The status set comes from the visibility policy: anonymous callers always get
/// `public` only, authenticated callers may narrow with `status`.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleListParams),
    responses((status = 200, description = "Article page", body = ArticleListResponse))
)]
pub async fn list_articles(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    params: Result<Query<ArticleListParams>, QueryRejection>,
) -> Result<Json<ArticleListResponse>, AppError> {
    let Query(params) = params?;
    let page = normalize_page(params.page.as_deref());
    let limit = normalize_limit(params.limit.as_deref());

    let statuses = visibility::list_statuses(
        identity.is_authenticated(),
        params.status.as_deref().unwrap_or(""),
    );
    let department = params.department.filter(|d| !d.is_empty());

    let query = ArticleQuery {
        statuses,
        department,
        page,
        limit,
    };
    let (articles, total_count) = state.repo.find_articles(&query).await?;

    Ok(Json(ArticleListResponse {
        articles: articles.into_iter().map(ArticleResponse::from).collect(),
        total_count,
        page,
        limit,
        total_pages: total_pages(total_count, limit),
    }))
}

/// get_article
///
/// [Public Route] Retrieves a single article by slug.
///
/// A missing slug and a draft both answer 404. An internal article answers 401
/// `LOGIN_REQUIRED` to anonymous callers.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Found", body = ArticleResponse),
        (status = 401, description = "Login required"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<ArticleResponse>, AppError> {
    let Path(slug) = slug?;
    let article = state.repo.find_article_by_slug(&slug).await?;
    let article = visibility::authorize_item(
        article,
        |a| a.status.as_str(),
        identity.is_authenticated(),
    )?;

    Ok(Json(ArticleResponse::from(article)))
}

// --- Profile Handlers ---

/// get_user_detail
///
/// [Public Route] Public profile with the user's articles.
///
/// Internal articles are included for any authenticated caller, or for anyone presenting
/// this profile's portfolio key. The key itself is only returned to its authenticated owner.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID"), PortfolioParams),
    responses(
        (status = 200, description = "Profile", body = UserDetailResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_detail(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    params: Result<Query<PortfolioParams>, QueryRejection>,
) -> Result<Json<UserDetailResponse>, AppError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    let access = PortfolioAccess::evaluate(
        user.id,
        identity.identity(),
        params.portfolio_key.as_deref(),
        &user.portfolio_key,
    );
    tracing::debug!(
        profile_id = user.id,
        elevated = access.show_elevated_content,
        owner = access.disclose_key,
        "profile access evaluated"
    );

    let statuses = visibility::list_statuses(access.show_elevated_content, "");
    let articles = state.repo.find_articles_by_author(user.id, &statuses).await?;

    Ok(Json(UserDetailResponse {
        id: user.id,
        name: user.name,
        affiliation: user.affiliation,
        icon_url: user.icon_url,
        created_at: user.created_at,
        portfolio_key: access.disclose_key.then_some(user.portfolio_key),
        articles: articles.into_iter().map(ArticleResponse::from).collect(),
    }))
}

// --- Auth Handlers ---

/// signup
///
/// [Public Route] Creates an account, issues a token and sets the `token` cookie.
///
/// Every account gets its own portfolio key here; it never changes afterwards.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    validate_signup(&payload)?;

    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(email_taken());
    }

    let raw_password = payload.password;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&raw_password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                AppError::Internal
            })??;

    let new_user = NewUser {
        name: payload.name,
        email: payload.email,
        password_hash,
        affiliation: payload.affiliation,
        portfolio_key: portfolio::generate_portfolio_key(),
    };

    let user = state.repo.create_user(new_user).await.map_err(|e| match e {
        RepoError::Conflict => email_taken(),
        other => other.into(),
    })?;

    let token = state.tokens.issue(user.id)?;
    let cookie = token_cookie(&state.config, &token)?;
    tracing::info!(user_id = user.id, "account created");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// login
///
/// [Public Route] Verifies email and password, issues a token and sets the `token` cookie.
/// Unknown email and wrong password answer the same 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request(
            "INVALID_REQUEST",
            "email and password are required",
        ));
    }

    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let stored_hash = user.password_hash.clone();
    let raw_password = payload.password;
    let verified =
        tokio::task::spawn_blocking(move || password::verify_password(&raw_password, &stored_hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password verification task failed");
                AppError::Internal
            })?;

    if !verified {
        tracing::debug!(user_id = user.id, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    let cookie = token_cookie(&state.config, &token)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// logout
///
/// [Public Route] Expires the `token` cookie. Tokens are not revoked server-side.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
pub async fn logout(State(config): State<AppConfig>) -> Result<impl IntoResponse, AppError> {
    let cookie = build_cookie(&config, "", 0)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "logged out".to_string(),
        }),
    ))
}

/// get_me
///
/// [Authenticated Route] The caller's own account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_me(
    Identity { subject_id }: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .repo
        .get_user(subject_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(&user)))
}

// --- Helpers ---

fn normalize_page(page: Option<&str>) -> i64 {
    match page.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(p) if p >= 1 => p,
        _ => DEFAULT_PAGE,
    }
}

fn normalize_limit(limit: Option<&str>) -> i64 {
    match limit.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
        _ => DEFAULT_LIMIT,
    }
}

fn total_pages(total_count: i64, limit: i64) -> i64 {
    (total_count + limit - 1) / limit
}

fn validate_signup(payload: &SignUpRequest) -> Result<(), AppError> {
    if payload.email.is_empty() || payload.password.is_empty() || payload.name.is_empty() {
        return Err(AppError::bad_request(
            "INVALID_REQUEST",
            "email, password and name are required",
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::bad_request("INVALID_EMAIL", "email is malformed"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "WEAK_PASSWORD",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if let Some(affiliation) = &payload.affiliation
        && !AFFILIATIONS.contains(&affiliation.as_str())
    {
        return Err(AppError::bad_request(
            "INVALID_AFFILIATION",
            format!("affiliation must be one of {}", AFFILIATIONS.join(", ")),
        ));
    }
    Ok(())
}

fn email_taken() -> AppError {
    AppError::conflict("EMAIL_TAKEN", "this email address is already registered")
}

fn token_cookie(config: &AppConfig, token: &str) -> Result<HeaderValue, AppError> {
    build_cookie(config, token, TOKEN_VALIDITY_HOURS * 3600)
}

// Production serves the frontend cross-site, which needs SameSite=None (and therefore Secure).
fn build_cookie(config: &AppConfig, value: &str, max_age: i64) -> Result<HeaderValue, AppError> {
    let same_site = if config.is_production() {
        "SameSite=None; Secure"
    } else {
        "SameSite=Lax"
    };
    let cookie =
        format!("{TOKEN_COOKIE_NAME}={value}; Path=/; Max-Age={max_age}; HttpOnly; {same_site}");

    HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!(error = %e, "token cookie is not a valid header value");
        AppError::Internal
    })
}
