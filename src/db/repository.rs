//! Principal repository for MODULIST.
//!
//! This module provides CRUD operations for principals in the database.

use chrono::Utc;
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::traits::UserDirectory;
use super::user::{NewPrincipal, Principal, PrincipalUpdate};
use super::DbPool;
use crate::{ModulistError, Result};

const SELECT_COLUMNS: &str = "SELECT id, first_name, last_name, mail, mail_verified, password_hash,
        privileges, enabled, created_at
 FROM users";

/// Repository for principal CRUD operations.
pub struct PrincipalRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PrincipalRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new principal.
    ///
    /// A fresh UUID is assigned as the stable identifier. Returns
    /// `ModulistError::Validation` if the contact address is taken.
    pub async fn create(&self, new_principal: &NewPrincipal) -> Result<Principal> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, mail, mail_verified, password_hash,
                                privileges, enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&id)
        .bind(&new_principal.first_name)
        .bind(&new_principal.last_name)
        .bind(&new_principal.mail)
        .bind(new_principal.mail_verified)
        .bind(&new_principal.password_hash)
        .bind(new_principal.privileges)
        .bind(new_principal.enabled)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ModulistError::Validation(format!("mail address already in use: {}", new_principal.mail))
            }
            _ => ModulistError::Database(e.to_string()),
        })?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ModulistError::NotFound("user".to_string()))
    }

    /// Get a principal by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Principal>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(principal)
    }

    /// Get a principal by contact address (case-insensitive).
    pub async fn get_by_mail(&self, mail: &str) -> Result<Option<Principal>> {
        let sql = format!("{SELECT_COLUMNS} WHERE mail = $1 COLLATE NOCASE");
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(mail)
            .fetch_optional(self.pool)
            .await?;
        Ok(principal)
    }

    /// Update a principal by ID.
    ///
    /// Only fields set in the update are modified. Returns the updated
    /// principal, or `None` if not found.
    pub async fn update(&self, id: &str, update: &PrincipalUpdate) -> Result<Option<Principal>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref hash) = update.password_hash {
            separated.push("password_hash = ");
            separated.push_bind_unseparated(hash.clone());
        }
        if let Some(privileges) = update.privileges {
            separated.push("privileges = ");
            separated.push_bind_unseparated(privileges);
        }
        if let Some(enabled) = update.enabled {
            separated.push("enabled = ");
            separated.push_bind_unseparated(enabled);
        }
        if let Some(verified) = update.mail_verified {
            separated.push("mail_verified = ");
            separated.push_bind_unseparated(verified);
        }

        query.push(" WHERE id = ");
        query.push_bind(id.to_string());

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Set a new password hash and drop every outstanding password link
    /// of the principal in one transaction.
    ///
    /// Returns the updated principal, or `None` if not found.
    pub async fn replace_password(&self, id: &str, password_hash: &str) -> Result<Option<Principal>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM password_links WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Delete a principal by ID. Outstanding password links cascade.
    ///
    /// Returns true if a principal was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all principals, ordered by last and first name.
    pub async fn list_all(&self) -> Result<Vec<Principal>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY last_name, first_name");
        let principals = sqlx::query_as::<_, Principal>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(principals)
    }

    /// Check if a contact address is already registered (case-insensitive).
    pub async fn mail_exists(&self, mail: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE mail = $1 COLLATE NOCASE)")
                .bind(mail)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}

impl UserDirectory for PrincipalRepository<'_> {
    async fn find_by_contact(&self, mail: &str) -> Result<Option<Principal>> {
        self.get_by_mail(mail).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>> {
        self.get_by_id(id).await
    }

    async fn update(&self, id: &str, update: &PrincipalUpdate) -> Result<Option<Principal>> {
        PrincipalRepository::update(self, id, update).await
    }
}
