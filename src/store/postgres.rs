// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Postgres-backed system of record

use super::{CoOwnerStore, NamespaceStore};
use crate::error::{KennelError, Result};
use crate::types::{NamespaceName, OwnerId, TenantNamespace};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const SELECT_NAMESPACES: &str =
    "SELECT id, name, owner_id, created_at, updated_at FROM namespaces";

pub struct PostgresStore {
    pool: PgPool,
}

/// Row shape of the `namespaces` table
#[derive(Debug, Clone, FromRow)]
struct DbNamespace {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DbNamespace {
    /// Names are validated again on the way out; rows older than the check constraint may be invalid
    fn into_namespace(self) -> Result<TenantNamespace> {
        Ok(TenantNamespace {
            id: self.id,
            name: NamespaceName::parse(self.name)?,
            owner_id: OwnerId(self.owner_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Convert listed rows, skipping any that no longer form a valid record
fn into_namespaces(rows: Vec<DbNamespace>) -> Vec<TenantNamespace> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_namespace() {
                Ok(ns) => Some(ns),
                Err(e) => {
                    warn!("Skipping namespace record {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

impl PostgresStore {
    /// Connect and bring the schema up to date
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        info!("Connected to system of record");

        Ok(Self { pool })
    }
}

#[async_trait]
impl NamespaceStore for PostgresStore {
    #[instrument(skip(self, namespace), fields(namespace = %namespace.name))]
    async fn create(&self, namespace: TenantNamespace) -> Result<TenantNamespace> {
        let insert = sqlx::query(
            "INSERT INTO namespaces (id, name, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(namespace.id)
        .bind(namespace.name.as_str())
        .bind(namespace.owner_id.0)
        .bind(namespace.created_at)
        .bind(namespace.updated_at)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => {
                debug!("Recorded namespace {}", namespace.name);
                Ok(namespace)
            }
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(KennelError::AlreadyRecorded(namespace.name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<TenantNamespace>> {
        let row = sqlx::query_as::<_, DbNamespace>(&format!("{} WHERE id = $1", SELECT_NAMESPACES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DbNamespace::into_namespace).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TenantNamespace>> {
        let row =
            sqlx::query_as::<_, DbNamespace>(&format!("{} WHERE name = $1", SELECT_NAMESPACES))
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        row.map(DbNamespace::into_namespace).transpose()
    }

    async fn list(&self) -> Result<Vec<TenantNamespace>> {
        let rows = sqlx::query_as::<_, DbNamespace>(&format!(
            "{} ORDER BY created_at, name",
            SELECT_NAMESPACES
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(into_namespaces(rows))
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<TenantNamespace>> {
        let rows = sqlx::query_as::<_, DbNamespace>(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at, name",
            SELECT_NAMESPACES
        ))
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(into_namespaces(rows))
    }

    async fn owner_exists(&self, owner: OwnerId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(owner.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CoOwnerStore for PostgresStore {
    #[instrument(skip(self))]
    async fn add_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM namespaces WHERE id = $1")
            .bind(namespace_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KennelError::NotRecorded(namespace_id.to_string()))?;

        if owner == user.0 {
            debug!("User {} already owns namespace {}", user, namespace_id);
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO namespace_co_owners (namespace_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(namespace_id)
        .bind(user.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()> {
        sqlx::query("DELETE FROM namespace_co_owners WHERE namespace_id = $1 AND user_id = $2")
            .bind(namespace_id)
            .bind(user.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_co_owners(&self, namespace_id: Uuid) -> Result<Vec<OwnerId>> {
        let users = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM namespace_co_owners WHERE namespace_id = $1 ORDER BY user_id",
        )
        .bind(namespace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users.into_iter().map(OwnerId).collect())
    }
}
