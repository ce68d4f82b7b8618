//! # Application State
//!
//! The shared state handed to every handler and stateful middleware. Axum
//! clones it per request, which is cheap: the pool is reference counted and
//! the configuration sits behind an `Arc`.

use crate::config::Config;
use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use tower_sessions_sqlx_store::SqliteStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, shared by the models and the session store
    pub db: SqlitePool,

    /// Startup configuration, read-only once serving begins
    pub config: Arc<Config>,
}

impl AppState {
    /// Initialize application state
    ///
    /// Connects to the database, runs the embedded migrations and creates the
    /// session table.
    ///
    /// # Errors
    /// Returns an error if the connection or any migration fails.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&db).await?;
        SqliteStore::new(db.clone()).migrate().await?;

        Ok(AppState {
            db,
            config: Arc::new(config.clone()),
        })
    }

    /// Session store backed by the application database
    pub fn session_store(&self) -> SqliteStore {
        SqliteStore::new(self.db.clone())
    }
}

async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = if database_url.contains(":memory:") {
        // Every connection to an in-memory database sees its own empty
        // database, so pin the pool to one connection that never expires.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    Ok(options.connect(database_url).await?)
}
