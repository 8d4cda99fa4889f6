use attend_core::model::{Subject, SubjectId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i64_to_u8(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn subject_id_to_text(id: SubjectId) -> String {
    id.to_string()
}

pub(crate) fn subject_id_from_text(raw: &str) -> Result<SubjectId, StorageError> {
    raw.parse::<SubjectId>().map_err(ser)
}

pub(crate) fn map_subject_row(row: &SqliteRow) -> Result<Subject, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let name: String = row.try_get("name").map_err(ser)?;

    Subject::from_persisted(
        subject_id_from_text(&id)?,
        &name,
        i64_to_u32("attended", row.try_get::<i64, _>("attended").map_err(ser)?)?,
        i64_to_u32("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
        i64_to_u8("target", row.try_get::<i64, _>("target").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
