use chrono::Utc;
use mfc_core::errors::MfcResult;
use mfc_core::filter::AppointmentPredicate;
use mfc_core::models::{
    appointment::{Appointment, AppointmentFields},
    history::{AuditedEntity, HistoryAction},
};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{delete_error, history, read_error, write_error};
use crate::filter::push_where;
use crate::models::{DbAppointment, convert_all};

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    filter: &AppointmentPredicate,
) -> MfcResult<Vec<Appointment>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT a.id, a.user_profile_id, a.service_id, a.branch_id, a.status, a.visit_date, \
         a.visit_time, a.created_at, a.updated_at FROM appointments a",
    );
    push_where(&mut query, filter);
    query.push(" ORDER BY a.created_at DESC");

    let rows = query
        .build_query_as::<DbAppointment>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    convert_all(rows)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> MfcResult<Option<Appointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    row.map(Appointment::try_from).transpose()
}

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    fields: &AppointmentFields,
) -> MfcResult<Appointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, branch_id={}, service_id={}, date={}",
        id, fields.branch_id, fields.service_id, fields.date
    );

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(fields.user_profile_id)
    .bind(fields.service_id)
    .bind(fields.branch_id)
    .bind(fields.status.code())
    .bind(fields.date)
    .bind(fields.time)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(write_error)?;

    let appointment = Appointment::try_from(row)?;
    history::record(
        &mut tx,
        AuditedEntity::Appointment,
        id,
        HistoryAction::Created,
        &appointment,
        now,
    )
    .await?;
    tx.commit().await.map_err(write_error)?;

    Ok(appointment)
}

pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &AppointmentFields,
) -> MfcResult<Option<Appointment>> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET user_profile_id = $2, service_id = $3, branch_id = $4, status = $5,
            visit_date = $6, visit_time = $7, updated_at = $8
        WHERE id = $1
        RETURNING id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(fields.user_profile_id)
    .bind(fields.service_id)
    .bind(fields.branch_id)
    .bind(fields.status.code())
    .bind(fields.date)
    .bind(fields.time)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(write_error)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let appointment = Appointment::try_from(row)?;
    history::record(
        &mut tx,
        AuditedEntity::Appointment,
        id,
        HistoryAction::Updated,
        &appointment,
        now,
    )
    .await?;
    tx.commit().await.map_err(write_error)?;

    Ok(Some(appointment))
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        RETURNING id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(delete_error)?;

    let Some(row) = row else {
        return Ok(false);
    };
    let appointment = Appointment::try_from(row)?;
    history::record(
        &mut tx,
        AuditedEntity::Appointment,
        id,
        HistoryAction::Deleted,
        &appointment,
        now,
    )
    .await?;
    tx.commit().await.map_err(write_error)?;

    Ok(true)
}
