use async_trait::async_trait;
use attend_core::model::User;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{SessionRepository, StorageError};

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn current_user(&self) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT email FROM signed_in_user WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let email: String = row.try_get("email").map_err(ser)?;
        User::new(email).map(Some).map_err(ser)
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO signed_in_user (id, email)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET email = excluded.email
            ",
        )
        .bind(user.email())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_user(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM signed_in_user WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
