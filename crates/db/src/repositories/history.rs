use chrono::{DateTime, Utc};
use mfc_core::errors::{MfcError, MfcResult};
use mfc_core::models::history::{AuditedEntity, HistoryAction, HistoryEntry};
use serde::Serialize;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{read_error, write_error};
use crate::models::{DbHistoryEntry, convert_all};

/// Appends a snapshot inside the caller's transaction.
pub async fn record<T: Serialize>(
    conn: &mut PgConnection,
    entity: AuditedEntity,
    entity_id: Uuid,
    action: HistoryAction,
    snapshot: &T,
    recorded_at: DateTime<Utc>,
) -> MfcResult<()> {
    let snapshot = serde_json::to_value(snapshot).map_err(|e| MfcError::Internal(Box::new(e)))?;

    sqlx::query(
        r#"
        INSERT INTO history (id, entity, entity_id, action, snapshot, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entity.code())
    .bind(entity_id)
    .bind(action.code())
    .bind(snapshot)
    .bind(recorded_at)
    .execute(conn)
    .await
    .map_err(write_error)?;

    Ok(())
}

pub async fn list_history(
    pool: &Pool<Postgres>,
    entity: AuditedEntity,
    entity_id: Uuid,
) -> MfcResult<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, DbHistoryEntry>(
        r#"
        SELECT id, entity, entity_id, action, snapshot, recorded_at
        FROM history
        WHERE entity = $1 AND entity_id = $2
        ORDER BY recorded_at DESC
        "#,
    )
    .bind(entity.code())
    .bind(entity_id)
    .fetch_all(pool)
    .await
    .map_err(read_error)?;

    convert_all(rows)
}
