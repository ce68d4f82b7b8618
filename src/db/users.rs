use crate::db::models::{timestamp, User};
use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Register a user, storing an Argon2 hash of `password`.
///
/// Fails with [`AppError::DuplicateEmail`] when the address is taken.
pub async fn insert(pool: &SqlitePool, name: &str, email: &str, password: &str) -> AppResult<i64> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?
        .to_string();

    let result = sqlx::query(
        "INSERT INTO users (name, email, hashed_password, created)
         VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed_password)
    .bind(timestamp(Utc::now()))
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateEmail
        }
        _ => AppError::Database(e),
    })?;

    Ok(result.last_insert_rowid())
}

/// Check an email/password pair, returning the user's id when it matches.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> AppResult<i64> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, hashed_password, created FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let parsed = PasswordHash::new(&user.hashed_password)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials)?;

    Ok(user.id)
}

/// Whether a user with this id is still registered.
pub async fn exists(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(found != 0)
}
