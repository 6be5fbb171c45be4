//! Postgres-backed identity store (enabled by the `postgres` feature).

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

use gatehouse_auth::{NewUser, User, UserChanges, UserId};

use super::store::{ProfileDefaults, StoreError, UserStore};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL DEFAULT '',
    profile_url TEXT NOT NULL DEFAULT '',
    password_hash TEXT,
    is_staff BOOLEAN NOT NULL DEFAULT FALSE,
    is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    date_joined TIMESTAMPTZ NOT NULL DEFAULT now()
)";

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Connect and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(backend)?;
        sqlx::query(SCHEMA).execute(&pool).await.map_err(backend)?;
        Ok(Self { pool })
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn row_to_user(row: &PgRow) -> User {
    User {
        id: UserId::new(row.get("id")),
        email: row.get("email"),
        full_name: row.get("full_name"),
        profile_url: row.get("profile_url"),
        password_hash: row.get("password_hash"),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
        is_active: row.get("is_active"),
        date_joined: row.get("date_joined"),
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (email, full_name, profile_url, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.profile_url)
        .bind(&new.password_hash)
        .bind(new.is_staff)
        .bind(new.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::EmailTaken
            } else {
                backend(e)
            }
        })?;

        Ok(row_to_user(&row))
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_or_create_by_email(
        &self,
        email: &str,
        defaults: ProfileDefaults,
    ) -> Result<(User, bool), StoreError> {
        // Atomic upsert: the unique index arbitrates concurrent first logins.
        let inserted = sqlx::query(
            "INSERT INTO users (email, full_name, profile_url) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING RETURNING *",
        )
        .bind(email)
        .bind(&defaults.full_name)
        .bind(&defaults.profile_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(row) = inserted {
            return Ok((row_to_user(&row), true));
        }

        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((row_to_user(&row), false))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY date_joined DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 full_name = COALESCE($3, full_name), \
                 profile_url = COALESCE($4, profile_url), \
                 is_active = COALESCE($5, is_active) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id.as_i64())
        .bind(&changes.email)
        .bind(&changes.full_name)
        .bind(&changes.profile_url)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::EmailTaken
            } else {
                backend(e)
            }
        })?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_active(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "UPDATE users SET is_active = NOT is_active WHERE id = $1 RETURNING *",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.as_ref().map(row_to_user))
    }
}
