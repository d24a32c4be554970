//! Rider account repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use zingcab_core::{
    models::{NewUser, User, UserUpdate},
    traits::UserRepository,
    AppError, AppResult,
};

use crate::pool::map_write_error;

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            SELECT id, name, phone_number, gender, email, dob, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user {}: {}", id, e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        debug!("Finding user by phone number");

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            SELECT id, name, phone_number, gender, email, dob, display_name, created_at
            FROM users
            WHERE phone_number = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by phone: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, user))]
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        debug!("Creating user: {}", user.name);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            INSERT INTO users (name, phone_number, gender, email, dob, display_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, phone_number, gender, email, dob, display_name, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.phone_number)
        .bind(&user.gender)
        .bind(&user.email)
        .bind(user.dob)
        .bind(&user.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating user: {}", e);
            map_write_error(e, "create user", "User already exists")
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: i32, update: &UserUpdate) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                gender = COALESCE($3, gender),
                email = COALESCE($4, email),
                dob = COALESCE($5, dob),
                display_name = COALESCE($6, display_name)
            WHERE id = $1
            RETURNING id, name, phone_number, gender, email, dob, display_name, created_at
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.gender)
        .bind(&update.email)
        .bind(update.dob)
        .bind(&update.display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating user {}: {}", id, e);
            AppError::Database(format!("Failed to update user: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting user {}: {}", id, e);
                AppError::Database(format!("Failed to delete user: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    phone_number: String,
    gender: Option<String>,
    email: Option<String>,
    dob: Option<NaiveDate>,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            gender: row.gender,
            email: row.email,
            dob: row.dob,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_duplicate_phone_is_conflict() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/zingcab".to_string());
        let pool = PgPool::connect(&url).await.unwrap();
        let repo = PgUserRepository::new(pool);

        let user = NewUser {
            name: "Asha".to_string(),
            phone_number: "9000000001".to_string(),
            gender: None,
            email: None,
            dob: None,
            display_name: None,
        };

        let _ = repo.create(&user).await;
        let err = repo.create(&user).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_update_then_delete() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/zingcab".to_string());
        let pool = PgPool::connect(&url).await.unwrap();
        let repo = PgUserRepository::new(pool);

        let user = repo
            .create(&NewUser {
                name: "Meera".to_string(),
                phone_number: "9000000002".to_string(),
                gender: None,
                email: None,
                dob: None,
                display_name: None,
            })
            .await
            .unwrap();

        let update = UserUpdate {
            display_name: Some("M".to_string()),
            ..Default::default()
        };
        let updated = repo.update(user.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("M"));
        assert_eq!(updated.name, "Meera");

        assert!(repo.delete(user.id).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
        assert!(repo.update(user.id, &update).await.unwrap().is_none());
    }
}
