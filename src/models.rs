use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Database Rows ---

/// User
///
/// Canonical account record from the `users` table. Carries the password hash and the
/// portfolio key, so it is never serialized directly; responses are built from it.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub affiliation: Option<String>,
    pub icon_url: Option<String>,
    // Secret capability for this profile's internal articles. Unique per account.
    pub portfolio_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for a freshly signed-up account. The password is already hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub affiliation: Option<String>,
    pub portfolio_key: String,
}

/// Article
///
/// An article row joined with its author's public fields.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Article {
    pub id: i64,
    pub author_id: i64,
    // "markdown" or "external".
    pub article_type: String,
    pub title: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub external_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub slug: String,
    pub department: String,
    // Visibility tier: "draft", "internal" or "public". Stored as free text.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Joined from `users`.
    pub author_name: String,
    pub author_affiliation: Option<String>,
    pub author_icon_url: Option<String>,
}

// --- Request Payloads ---

/// SignUpRequest
///
/// Input for `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignUpRequest {
    #[schema(example = "user@example.com")]
    pub email: String,
    /// At least 8 characters.
    pub password: String,
    pub name: String,
    /// One of `Dev`, `MKT`, `Ops`.
    pub affiliation: Option<String>,
}

/// LoginRequest
///
/// Input for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "user@example.com")]
    pub email: String,
    pub password: String,
}

// --- Responses ---

/// UserResponse
///
/// The caller's own account, returned by sign-up, login and `/api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub affiliation: Option<String>,
    pub icon_url: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            affiliation: user.affiliation.clone(),
            icon_url: user.icon_url.clone(),
        }
    }
}

/// AuthResponse
///
/// Result of a successful sign-up or login. The token is also set as the `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// AuthorResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// ArticleResponse
///
/// Public shape of an article, with its author summary embedded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    #[schema(example = "markdown")]
    pub article_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub slug: String,
    #[schema(example = "Dev")]
    pub department: String,
    #[schema(example = "public")]
    pub status: String,
    pub author: AuthorResponse,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    // No tag storage exists yet, so this is always serialized as `[]`.
    pub tags: Vec<String>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            article_type: article.article_type,
            content: article.content,
            description: article.description,
            external_url: article.external_url,
            thumbnail_url: article.thumbnail_url,
            slug: article.slug,
            department: article.department,
            status: article.status,
            author: AuthorResponse {
                id: article.author_id,
                name: article.author_name,
                affiliation: article.author_affiliation,
                icon_url: article.author_icon_url,
            },
            created_at: article.created_at,
            updated_at: article.updated_at,
            tags: Vec::new(),
        }
    }
}

/// ArticleListResponse
///
/// One page of articles plus the pagination totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// UserDetailResponse
///
/// Public profile page. Never includes email or password hash. `portfolio_key` is only
/// present when the authenticated owner views their own profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDetailResponse {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_key: Option<String>,
    pub articles: Vec<ArticleResponse>,
}

/// MessageResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
