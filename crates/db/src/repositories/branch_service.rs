use chrono::Utc;
use mfc_core::errors::MfcResult;
use mfc_core::filter::BranchServicePredicate;
use mfc_core::models::branch_service::{BranchService, BranchServiceFields};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{read_error, write_error};
use crate::filter::push_where;
use crate::models::DbBranchService;

const SELECT_JOINED: &str = r#"
    SELECT bs.id, bs.branch_id, b.name AS branch_name, bs.service_id, s.name AS service_name,
           bs.is_available, bs.updated_at
    FROM branch_services bs
    JOIN branches b ON b.id = bs.branch_id
    JOIN services s ON s.id = bs.service_id
"#;

pub async fn list_branch_services(
    pool: &Pool<Postgres>,
    filter: &BranchServicePredicate,
) -> MfcResult<Vec<BranchService>> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_JOINED);
    push_where(&mut query, filter);
    query.push(" ORDER BY b.name ASC, s.name ASC");

    let rows = query
        .build_query_as::<DbBranchService>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    Ok(rows.into_iter().map(BranchService::from).collect())
}

pub async fn get_branch_service_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> MfcResult<Option<BranchService>> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_JOINED);
    query.push(" WHERE bs.id = ").push_bind(id);

    let row = query
        .build_query_as::<DbBranchService>()
        .fetch_optional(pool)
        .await
        .map_err(read_error)?;

    Ok(row.map(BranchService::from))
}

pub async fn create_branch_service(
    pool: &Pool<Postgres>,
    fields: &BranchServiceFields,
) -> MfcResult<BranchService> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Linking service: branch_id={}, service_id={}",
        fields.branch_id, fields.service_id
    );

    sqlx::query(
        r#"
        INSERT INTO branch_services (id, branch_id, service_id, is_available, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(fields.branch_id)
    .bind(fields.service_id)
    .bind(fields.is_available)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(write_error)?;

    get_branch_service_by_id(pool, id)
        .await?
        .ok_or_else(|| mfc_core::errors::MfcError::not_found("Branch service", id))
}

pub async fn set_availability(
    pool: &Pool<Postgres>,
    id: Uuid,
    available: bool,
) -> MfcResult<Option<BranchService>> {
    let updated = sqlx::query(
        r#"
        UPDATE branch_services
        SET is_available = $2, updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(available)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(write_error)?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }
    get_branch_service_by_id(pool, id).await
}

pub async fn delete_branch_service(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let deleted = sqlx::query("DELETE FROM branch_services WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(write_error)?;

    Ok(deleted.rows_affected() > 0)
}
