#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use chrono::{DateTime, TimeDelta, Utc};
use portfolio_blog::{
    AppState,
    auth::{TokenCodec, password},
    config::AppConfig,
    models::{Article, NewUser, User},
    repository::{ArticleQuery, RepoError, Repository},
};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};

// --- In-Memory Repository ---

// Mirrors the Postgres filters: status set, optional department, newest first.
#[derive(Default)]
pub struct InMemoryRepo {
    pub users: Mutex<Vec<User>>,
    pub articles: Vec<Article>,
    // Last listing query, so tests can check what the handler asked for.
    pub last_query: Mutex<Option<ArticleQuery>>,
    pub last_author_statuses: Mutex<Option<Vec<String>>>,
}

impl InMemoryRepo {
    pub fn last_query(&self) -> Option<ArticleQuery> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn last_author_statuses(&self) -> Option<Vec<String>> {
        self.last_author_statuses.lock().unwrap().clone()
    }
}

fn newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    articles
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn find_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), RepoError> {
        *self.last_query.lock().unwrap() = Some(query.clone());

        let matching = newest_first(
            self.articles
                .iter()
                .filter(|a| query.statuses.contains(&a.status))
                .filter(|a| query.department.as_ref().is_none_or(|d| &a.department == d))
                .cloned()
                .collect(),
        );
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, RepoError> {
        Ok(self.articles.iter().find(|a| a.slug == slug).cloned())
    }

    async fn find_articles_by_author(
        &self,
        author_id: i64,
        statuses: &[String],
    ) -> Result<Vec<Article>, RepoError> {
        *self.last_author_statuses.lock().unwrap() = Some(statuses.to_vec());

        Ok(newest_first(
            self.articles
                .iter()
                .filter(|a| a.author_id == author_id && statuses.contains(&a.status))
                .cloned()
                .collect(),
        ))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let created = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            affiliation: user.affiliation,
            icon_url: None,
            portfolio_key: user.portfolio_key,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }
}

// --- Fixtures ---

pub const TEST_SECRET: &str = "test-secret-value-1234567890";

pub const ALICE_ID: i64 = 1;
pub const BOB_ID: i64 = 2;
pub const ALICE_KEY: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";
pub const BOB_KEY: &str = "aaaabbbbccccddddeeeeffff00001111";
pub const ALICE_PASSWORD: &str = "correct-horse-battery";

pub fn codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET).unwrap()
}

pub fn token_for(subject_id: i64) -> String {
    codec().issue(subject_id).unwrap()
}

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap()
}

pub fn user(id: i64, name: &str, portfolio_key: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: String::new(),
        affiliation: Some("Dev".to_string()),
        icon_url: None,
        portfolio_key: portfolio_key.to_string(),
        created_at: base_time(),
        updated_at: base_time(),
    }
}

// `age` orders the fixtures: a larger age is older.
pub fn article(id: i64, author: &User, slug: &str, status: &str, department: &str, age: i64) -> Article {
    let created_at = base_time() - TimeDelta::minutes(age);
    Article {
        id,
        author_id: author.id,
        article_type: "markdown".to_string(),
        title: format!("Title of {slug}"),
        content: Some(format!("# {slug}")),
        slug: slug.to_string(),
        department: department.to_string(),
        status: status.to_string(),
        created_at,
        updated_at: created_at,
        author_name: author.name.clone(),
        author_affiliation: author.affiliation.clone(),
        ..Article::default()
    }
}

/// Two authors, every status, two departments.
///
/// | slug         | author | status   | department |
/// |--------------|--------|----------|------------|
/// | a-public     | alice  | public   | Dev        |
/// | a-internal   | alice  | internal | Dev        |
/// | a-draft      | alice  | draft    | Dev        |
/// | b-public     | bob    | public   | MKT        |
/// | b-internal   | bob    | internal | Ops        |
pub fn seeded_repo() -> InMemoryRepo {
    let mut alice = user(ALICE_ID, "Alice", ALICE_KEY);
    alice.password_hash = password::hash_password(ALICE_PASSWORD).unwrap();
    let bob = user(BOB_ID, "Bob", BOB_KEY);

    let articles = vec![
        article(1, &alice, "a-public", "public", "Dev", 50),
        article(2, &alice, "a-internal", "internal", "Dev", 40),
        article(3, &alice, "a-draft", "draft", "Dev", 30),
        article(4, &bob, "b-public", "public", "MKT", 20),
        article(5, &bob, "b-internal", "internal", "Ops", 10),
    ];

    InMemoryRepo {
        users: Mutex::new(vec![alice, bob]),
        articles,
        ..InMemoryRepo::default()
    }
}

pub fn create_test_state(repo: Arc<InMemoryRepo>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
        tokens: codec(),
    }
}

// --- HTTP Helpers ---

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", format!("token={token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("response body is not the expected JSON")
}
