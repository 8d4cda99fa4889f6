use async_trait::async_trait;
use attend_core::model::{Subject, SubjectId, UserKey};

use super::SqliteRepository;
use super::mapping::{conn, map_subject_row, subject_id_to_text};
use crate::repository::{StorageError, SubjectRepository};

#[async_trait]
impl SubjectRepository for SqliteRepository {
    async fn list_subjects(&self, user: &UserKey) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, attended, total, target, created_at
            FROM subjects
            WHERE user_key = ?1
            ORDER BY seq ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_subject_row).collect()
    }

    async fn get_subject(
        &self,
        user: &UserKey,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, attended, total, target, created_at
            FROM subjects
            WHERE user_key = ?1 AND id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(subject_id_to_text(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_subject_row).transpose()
    }

    async fn insert_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO subjects (id, user_key, name, attended, total, target, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_key, id) DO NOTHING
            ",
        )
        .bind(subject_id_to_text(subject.id()))
        .bind(user.as_str())
        .bind(subject.name())
        .bind(i64::from(subject.attended()))
        .bind(i64::from(subject.total()))
        .bind(i64::from(subject.target()))
        .bind(subject.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn update_subject(&self, user: &UserKey, subject: &Subject) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE subjects
            SET name = ?3, attended = ?4, total = ?5, target = ?6
            WHERE user_key = ?1 AND id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(subject_id_to_text(subject.id()))
        .bind(subject.name())
        .bind(i64::from(subject.attended()))
        .bind(i64::from(subject.total()))
        .bind(i64::from(subject.target()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_subject(&self, user: &UserKey, id: SubjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM subjects WHERE user_key = ?1 AND id = ?2")
            .bind(user.as_str())
            .bind(subject_id_to_text(id))
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
