//! Persistent component store using SQLite with an FTS5 search index.
//!
//! The `components` table holds one row per scraped item; `components_fts` is
//! an external-content FTS5 table over name/description/category, kept in sync
//! by triggers so callers never touch the index directly.

pub mod loader;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;

/// SQL schema for the component store.
const SCHEMA_SQL: &str = r#"
-- One row per scraped gallery item
CREATE TABLE IF NOT EXISTS components (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    code TEXT,
    dependencies TEXT,
    preview_image TEXT,
    json_data TEXT,
    file_path TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

-- Full-text index over the searchable columns, backed by the components table
CREATE VIRTUAL TABLE IF NOT EXISTS components_fts USING fts5(
    name,
    description,
    category,
    content='components',
    content_rowid='id'
);

-- Keep the index in sync with the content table
CREATE TRIGGER IF NOT EXISTS components_ai AFTER INSERT ON components BEGIN
    INSERT INTO components_fts(rowid, name, description, category)
    VALUES (new.id, new.name, new.description, new.category);
END;

CREATE TRIGGER IF NOT EXISTS components_ad AFTER DELETE ON components BEGIN
    INSERT INTO components_fts(components_fts, rowid, name, description, category)
    VALUES ('delete', old.id, old.name, old.description, old.category);
END;

CREATE TRIGGER IF NOT EXISTS components_au AFTER UPDATE ON components BEGIN
    INSERT INTO components_fts(components_fts, rowid, name, description, category)
    VALUES ('delete', old.id, old.name, old.description, old.category);
    INSERT INTO components_fts(rowid, name, description, category)
    VALUES (new.id, new.name, new.description, new.category);
END;
"#;

/// One component row as read back from the store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub code: Option<String>,
    pub dependencies: Option<String>,
    pub preview_image: Option<String>,
    pub json_data: Option<String>,
    pub file_path: Option<String>,
}

/// Fields for one insert; the id and timestamp are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewComponent {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub code: Option<String>,
    /// Space-separated package names, flattened from the payload.
    pub dependencies: Option<String>,
    pub preview_image: Option<String>,
    /// The raw JSON artifact text, kept verbatim for detail rendering.
    pub json_data: Option<String>,
    /// Path of the code artifact relative to the artifact root.
    pub file_path: Option<String>,
}

/// Handle to the component database.
#[derive(Debug, Clone)]
pub struct ComponentStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl ComponentStore {
    /// Open the store read-write, creating the file and schema as needed.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&pool)
            .await
            .context("Failed to initialize database schema")?;

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Open an existing store read-only. Fails when the file is missing.
    pub async fn open_read_only(db_path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(db_path).await.unwrap_or(false) {
            anyhow::bail!("database not found at {}", db_path.display());
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database read-only")?;

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert(&self, component: &NewComponent) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO components
                (name, description, category, code, dependencies, preview_image, json_data, file_path)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&component.name)
        .bind(&component.description)
        .bind(&component.category)
        .bind(&component.code)
        .bind(&component.dependencies)
        .bind(&component.preview_image)
        .bind(&component.json_data)
        .bind(&component.file_path)
        .execute(&self.pool)
        .await
        .context("Failed to insert component")?;

        Ok(result.last_insert_rowid())
    }

    /// Delete every row; the triggers clear the FTS index alongside.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM components")
            .execute(&self.pool)
            .await
            .context("Failed to clear components table")?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM components")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count components")?;
        Ok(row.0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
