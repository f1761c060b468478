//! User storage.

use chrono::Utc;
use rusqlite::{params, Row, ToSql};
use tracing::info;

use super::{versioned::conditional_update, Store, StoreError};
use crate::{auth::models::Role, models::User};

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get(4)?;
    let role = Role::from_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown role {role_str}").into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        activated: row.get(5)?,
        created_at: row.get(6)?,
        version: row.get(7)?,
    })
}

impl Store {
    /// Insert a new user. Role defaults to `user`; the version counter starts
    /// at 1. A duplicate email surfaces as `StoreError::Duplicate("email")`.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        activated: bool,
    ) -> Result<User, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339();

        let (id, version) = conn.query_row(
            "INSERT INTO users (name, email, password_hash, activated, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, version",
            params![name, email, password_hash, activated, created_at],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        info!(user = name, "created user");

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::User,
            activated,
            created_at,
            version,
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let conn = self.conn()?;
        let user = conn.query_row(
            "SELECT id, name, email, password_hash, role, activated, created_at, version
             FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        )?;
        Ok(user)
    }

    /// Full-field conditional update; bumps the version or fails with
    /// `EditConflict` if the caller's snapshot is stale.
    pub fn update_user(&self, user: &User, expected_version: i64) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let role = user.role.as_str();
        let values: [&dyn ToSql; 5] = [
            &user.name,
            &user.email,
            &role,
            &user.activated,
            &user.password_hash,
        ];

        conditional_update(
            &conn,
            "users",
            &["name", "email", "role", "activated", "password_hash"],
            &values,
            user.id,
            expected_version,
            None,
        )
    }
}
