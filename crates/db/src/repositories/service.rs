use chrono::Utc;
use mfc_core::errors::MfcResult;
use mfc_core::filter::{ServicePredicate, ServiceSort};
use mfc_core::models::{
    history::{AuditedEntity, HistoryAction},
    service::{Service, ServiceFields},
};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{delete_error, history, read_error, write_error};
use crate::filter::{push_where, service_order};
use crate::models::{DbService, convert_all};

pub async fn list_services(
    pool: &Pool<Postgres>,
    filter: &ServicePredicate,
    sort: ServiceSort,
) -> MfcResult<Vec<Service>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT s.id, s.name, s.category, s.duration_days, s.created_at, s.updated_at \
         FROM services s",
    );
    push_where(&mut query, filter);
    query.push(" ORDER BY ").push(service_order(sort));

    tracing::debug!("Listing services: {}", query.sql());
    let rows = query
        .build_query_as::<DbService>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    convert_all(rows)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<Option<Service>> {
    let row = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, category, duration_days, created_at, updated_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    row.map(Service::try_from).transpose()
}

pub async fn get_service_by_name(pool: &Pool<Postgres>, name: &str) -> MfcResult<Option<Service>> {
    let row = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, category, duration_days, created_at, updated_at
        FROM services
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    row.map(Service::try_from).transpose()
}

pub async fn create_service(pool: &Pool<Postgres>, fields: &ServiceFields) -> MfcResult<Service> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating service: id={}, name={}", id, fields.name);

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, name, category, duration_days, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, name, category, duration_days, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.name)
    .bind(fields.category.code())
    .bind(fields.duration_days)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(write_error)?;

    let service = Service::try_from(row)?;
    history::record(&mut tx, AuditedEntity::Service, id, HistoryAction::Created, &service, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(service)
}

pub async fn update_service(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &ServiceFields,
) -> MfcResult<Option<Service>> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbService>(
        r#"
        UPDATE services
        SET name = $2, category = $3, duration_days = $4, updated_at = $5
        WHERE id = $1
        RETURNING id, name, category, duration_days, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.name)
    .bind(fields.category.code())
    .bind(fields.duration_days)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(write_error)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let service = Service::try_from(row)?;
    history::record(&mut tx, AuditedEntity::Service, id, HistoryAction::Updated, &service, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(Some(service))
}

pub async fn delete_service(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbService>(
        r#"
        DELETE FROM services
        WHERE id = $1
        RETURNING id, name, category, duration_days, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(delete_error)?;

    let Some(row) = row else {
        return Ok(false);
    };
    let service = Service::try_from(row)?;
    history::record(&mut tx, AuditedEntity::Service, id, HistoryAction::Deleted, &service, now).await?;
    tx.commit().await.map_err(write_error)?;

    Ok(true)
}
