use chrono::Utc;
use mfc_core::errors::MfcResult;
use mfc_core::filter::{BranchPredicate, BranchSort};
use mfc_core::models::{
    branch::{Branch, BranchFields},
    history::{AuditedEntity, HistoryAction},
};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{delete_error, history, read_error, write_error};
use crate::filter::{branch_order, push_where};
use crate::models::DbBranch;

pub async fn list_branches(
    pool: &Pool<Postgres>,
    filter: &BranchPredicate,
    sort: BranchSort,
) -> MfcResult<Vec<Branch>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT b.id, b.name, b.address, b.phone, b.email, b.photo, b.work_schedule, \
         b.is_active, b.created_at, b.updated_at FROM branches b",
    );
    push_where(&mut query, filter);
    query.push(" ORDER BY ").push(branch_order(sort));

    tracing::debug!("Listing branches: {}", query.sql());
    let rows = query
        .build_query_as::<DbBranch>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    Ok(rows.into_iter().map(Branch::from).collect())
}

pub async fn get_branch_by_id(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<Option<Branch>> {
    let row = sqlx::query_as::<_, DbBranch>(
        r#"
        SELECT id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at
        FROM branches
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    Ok(row.map(Branch::from))
}

pub async fn create_branch(pool: &Pool<Postgres>, fields: &BranchFields) -> MfcResult<Branch> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating branch: id={}, email={}", id, fields.email);

    let mut tx = pool.begin().await.map_err(read_error)?;
    let branch: Branch = sqlx::query_as::<_, DbBranch>(
        r#"
        INSERT INTO branches (id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NULL, $6, $7, $8, $8)
        RETURNING id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.address)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.work_schedule)
    .bind(fields.is_active)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(write_error)?
    .into();

    history::record(&mut tx, AuditedEntity::Branch, id, HistoryAction::Created, &branch, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(branch)
}

pub async fn update_branch(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &BranchFields,
) -> MfcResult<Option<Branch>> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbBranch>(
        r#"
        UPDATE branches
        SET name = $2, address = $3, phone = $4, email = $5, work_schedule = $6, is_active = $7, updated_at = $8
        WHERE id = $1
        RETURNING id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.address)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.work_schedule)
    .bind(fields.is_active)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(write_error)?;

    let Some(branch) = row.map(Branch::from) else {
        return Ok(None);
    };
    history::record(&mut tx, AuditedEntity::Branch, id, HistoryAction::Updated, &branch, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(Some(branch))
}

pub async fn set_branch_photo(
    pool: &Pool<Postgres>,
    id: Uuid,
    photo: Option<&str>,
) -> MfcResult<Option<Branch>> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbBranch>(
        r#"
        UPDATE branches
        SET photo = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(photo)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(write_error)?;

    let Some(branch) = row.map(Branch::from) else {
        return Ok(None);
    };
    history::record(&mut tx, AuditedEntity::Branch, id, HistoryAction::Updated, &branch, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(Some(branch))
}

/// Returns `false` when no branch has this id. Availability links go with the
/// branch; employees and appointments block the delete.
pub async fn delete_branch(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbBranch>(
        r#"
        DELETE FROM branches
        WHERE id = $1
        RETURNING id, name, address, phone, email, photo, work_schedule, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(delete_error)?;

    let Some(branch) = row.map(Branch::from) else {
        return Ok(false);
    };
    history::record(&mut tx, AuditedEntity::Branch, id, HistoryAction::Deleted, &branch, now).await?;
    tx.commit().await.map_err(write_error)?;

    tracing::debug!("Branch deleted: id={}", id);
    Ok(true)
}
