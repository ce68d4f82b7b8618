use crate::db::models::{timestamp, Snippet};
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

/// How many snippets the home page lists
const LATEST_LIMIT: i64 = 10;

/// Insert a snippet that expires `expires_days` from now, returning its id.
pub async fn insert(
    pool: &SqlitePool,
    title: &str,
    content: &str,
    expires_days: i64,
) -> AppResult<i64> {
    let now = Utc::now();
    let expires = now + Duration::days(expires_days);

    let result = sqlx::query(
        "INSERT INTO snippets (title, content, created, expires)
         VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(content)
    .bind(timestamp(now))
    .bind(timestamp(expires))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch a snippet that has not expired yet.
pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Snippet> {
    let snippet = sqlx::query_as::<_, Snippet>(
        "SELECT id, title, content, created, expires FROM snippets
         WHERE expires > ? AND id = ?",
    )
    .bind(timestamp(Utc::now()))
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => AppError::NotFound,
        _ => AppError::Database(e),
    })?;

    Ok(snippet)
}

/// The most recently created snippets that are still live, newest first.
pub async fn latest(pool: &SqlitePool) -> AppResult<Vec<Snippet>> {
    let snippets = sqlx::query_as::<_, Snippet>(
        "SELECT id, title, content, created, expires FROM snippets
         WHERE expires > ? ORDER BY id DESC LIMIT ?",
    )
    .bind(timestamp(Utc::now()))
    .bind(LATEST_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(snippets)
}
