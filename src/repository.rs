use crate::models::{Article, NewUser, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;

/// RepoError
///
/// What the storage layer reports upward. Unique-constraint violations are lifted into
/// `Conflict`; everything else stays an opaque database failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}

/// ArticleQuery
///
/// Parameters of a paginated article listing. `statuses` comes from the visibility
/// policy and is never empty; `department` is ANDed on independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub statuses: Vec<String>,
    pub department: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl ArticleQuery {
    /// Rows to skip. Saturates for absurd page numbers, which then read past the end.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Repository Trait
///
/// The storage collaborator of the visibility engine. Implementations only filter by
/// the status sets they are handed; deciding those sets is the policy's job.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Articles ---
    /// One page of articles whose status is in `query.statuses`, newest first, plus the
    /// total number of matching rows.
    async fn find_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), RepoError>;
    /// Any article with this slug, whatever its status.
    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, RepoError>;
    /// All articles by one author whose status is in `statuses`, newest first.
    async fn find_articles_by_author(
        &self,
        author_id: i64,
        statuses: &[String],
    ) -> Result<Vec<Article>, RepoError>;

    // --- Users ---
    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    /// Fails with `RepoError::Conflict` if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const ARTICLE_SELECT: &str = r#"
    SELECT
        a.id, a.author_id, a.article_type, a.title, a.content, a.description,
        a.external_url, a.thumbnail_url, a.slug, a.department, a.status,
        a.created_at, a.updated_at,
        u.name AS author_name, u.affiliation AS author_affiliation, u.icon_url AS author_icon_url
    FROM articles a
    JOIN users u ON u.id = a.author_id
"#;

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, affiliation, icon_url, portfolio_key, created_at, updated_at
"#;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Appends the WHERE clause shared by the page query and the count query.
fn push_article_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ArticleQuery) {
    builder.push(" WHERE a.status = ANY(");
    builder.push_bind(query.statuses.clone());
    builder.push(")");

    if let Some(department) = &query.department {
        builder.push(" AND a.department = ");
        builder.push_bind(department.clone());
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// find_articles
    ///
    /// Built with QueryBuilder so every filter value is a bound parameter.
    async fn find_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), RepoError> {
        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM articles a");
        push_article_filters(&mut count, query);

        let total_count: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("find_articles count error: {:?}", e);
                RepoError::from_sqlx(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(ARTICLE_SELECT);
        push_article_filters(&mut select, query);
        select.push(" ORDER BY a.created_at DESC LIMIT ");
        select.push_bind(query.limit);
        select.push(" OFFSET ");
        select.push_bind(query.offset());

        let articles = select
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("find_articles error: {:?}", e);
                RepoError::from_sqlx(e)
            })?;

        Ok((articles, total_count))
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, RepoError> {
        let sql = format!("{ARTICLE_SELECT} WHERE a.slug = $1");

        sqlx::query_as::<_, Article>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("find_article_by_slug error: {:?}", e);
                RepoError::from_sqlx(e)
            })
    }

    async fn find_articles_by_author(
        &self,
        author_id: i64,
        statuses: &[String],
    ) -> Result<Vec<Article>, RepoError> {
        let sql = format!(
            "{ARTICLE_SELECT} WHERE a.author_id = $1 AND a.status = ANY($2) ORDER BY a.created_at DESC"
        );

        sqlx::query_as::<_, Article>(&sql)
            .bind(author_id)
            .bind(statuses.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("find_articles_by_author error: {:?}", e);
                RepoError::from_sqlx(e)
            })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    /// create_user
    ///
    /// Inserts the account and returns the stored row, timestamps included.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO users (name, email, password_hash, affiliation, portfolio_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.affiliation)
            .bind(user.portfolio_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = RepoError::from_sqlx(e);
                if let RepoError::Db(inner) = &err {
                    tracing::error!("create_user error: {:?}", inner);
                }
                err
            })
    }
}
