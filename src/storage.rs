//! SQLite-backed key/value store standing in for browser local storage.
//!
//! Only three keys are ever written: `token`, `agencyId` and the transient
//! `personalInfo` registration draft. See [`crate::session`].

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::StorageError;

pub type Pool = SqlitePool;

pub const KEY_TOKEN: &str = "token";
pub const KEY_AGENCY_ID: &str = "agencyId";
pub const KEY_PERSONAL_INFO: &str = "personalInfo";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url)?;
    let pool = SqlitePool::connect(&normalized).await?;
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and make sure the file gets created on first connect.
/// Leaves in-memory and non-sqlite URLs untouched.
fn prepare_sqlite_url(url: &str) -> Result<String> {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return Ok(url.to_string());
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return Ok(url.to_string());
    }

    let expanded_path = match path_part.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
            Err(_) => path_part.to_string(),
        },
        None => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    match query_part {
        Some(q) if q.contains("mode=") => {
            rebuilt.push('?');
            rebuilt.push_str(q);
        }
        Some(q) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
            rebuilt.push_str("&mode=rwc");
        }
        None => rebuilt.push_str("?mode=rwc"),
    }
    Ok(rebuilt)
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_item(pool: &Pool, key: &str) -> Result<Option<String>, StorageError> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

#[instrument(skip(pool, value))]
pub async fn set_item(pool: &Pool, key: &str, value: &str) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO local_storage (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn remove_item(pool: &Pool, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM local_storage WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_pool() -> Pool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn set_get_overwrite_remove() {
        let pool = setup_pool().await;
        assert_eq!(get_item(&pool, KEY_TOKEN).await.unwrap(), None);

        set_item(&pool, KEY_TOKEN, "abc").await.unwrap();
        assert_eq!(get_item(&pool, KEY_TOKEN).await.unwrap().as_deref(), Some("abc"));

        set_item(&pool, KEY_TOKEN, "def").await.unwrap();
        assert_eq!(get_item(&pool, KEY_TOKEN).await.unwrap().as_deref(), Some("def"));

        remove_item(&pool, KEY_TOKEN).await.unwrap();
        assert_eq!(get_item(&pool, KEY_TOKEN).await.unwrap(), None);
    }

    #[test]
    fn prepare_url_passthrough_and_create_mode() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgres://localhost/db").unwrap(),
            "postgres://localhost/db"
        );

        let td = tempfile::tempdir().unwrap();
        let file = td.path().join("nested").join("session.db");
        let url = format!("sqlite://{}", file.display());
        let prepared = prepare_sqlite_url(&url).unwrap();
        assert!(prepared.ends_with("session.db?mode=rwc"));
        assert!(file.parent().unwrap().exists());

        let with_mode = format!("sqlite://{}?mode=ro", file.display());
        assert!(prepare_sqlite_url(&with_mode).unwrap().ends_with("?mode=ro"));
    }

    #[test]
    fn unusable_parent_dir_is_reported() {
        let td = tempfile::tempdir().unwrap();
        let blocker = td.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let url = format!("sqlite://{}", blocker.join("session.db").display());
        let err = prepare_sqlite_url(&url).unwrap_err();
        assert!(err.to_string().contains("failed to create storage directory"));
    }
}
