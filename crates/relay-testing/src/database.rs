//! Throwaway PostgreSQL databases for store tests.
//!
//! Each [`TestDatabase`] is a freshly created database on the server named by
//! `DATABASE_URL`, migrated with the relay schema. Tests call
//! [`TestDatabase::cleanup`] when done; databases left behind by a failed test
//! are prefixed `relay_test_` and safe to remove.

use std::time::Duration;

use anyhow::{Context, Result};
use relay_core::Storage;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// An isolated, migrated database.
#[derive(Debug)]
pub struct TestDatabase {
    pool: PgPool,
    admin_pool: PgPool,
    database_name: String,
}

impl TestDatabase {
    /// Creates and migrates a new database.
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is unset, the server is unreachable,
    /// or the migrations fail.
    pub async fn new() -> Result<Self> {
        let options = connect_options()?;
        let admin_pool = pool_for(options.clone().database("postgres"))
            .await
            .context("failed to connect to admin database")?;

        let database_name = format!("relay_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE DATABASE \"{database_name}\""))
            .execute(&admin_pool)
            .await
            .with_context(|| format!("failed to create database {database_name}"))?;

        let pool = pool_for(options.database(&database_name))
            .await
            .with_context(|| format!("failed to connect to {database_name}"))?;

        Storage::new(pool.clone()).migrate().await.context("failed to migrate test database")?;
        debug!(database = %database_name, "created test database");

        Ok(Self { pool, admin_pool, database_name })
    }

    /// Pool connected to this database.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Production storage over this database.
    pub fn storage(&self) -> Storage {
        Storage::new(self.pool.clone())
    }

    /// Name of the created database.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Closes connections and drops the database.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be dropped.
    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;

        let result = sqlx::query(&format!(
            "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
            self.database_name
        ))
        .execute(&self.admin_pool)
        .await;

        if let Err(e) = result {
            warn!(database = %self.database_name, error = %e, "failed to drop test database");
            return Err(e).context("failed to drop test database");
        }

        Ok(())
    }
}

fn connect_options() -> Result<PgConnectOptions> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

    database_url.parse::<PgConnectOptions>().context("failed to parse DATABASE_URL")
}

async fn pool_for(options: PgConnectOptions) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    Ok(pool)
}
