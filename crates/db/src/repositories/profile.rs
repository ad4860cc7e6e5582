use chrono::Utc;
use mfc_core::errors::MfcResult;
use mfc_core::filter::ProfilePredicate;
use mfc_core::models::{
    appointment::Appointment,
    history::{AuditedEntity, HistoryAction},
    profile::{ProfileFields, UserProfile},
};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{delete_error, history, read_error, write_error};
use crate::filter::push_where;
use crate::models::{DbAppointment, DbUserProfile, convert_all};

pub async fn list_profiles(
    pool: &Pool<Postgres>,
    filter: &ProfilePredicate,
) -> MfcResult<Vec<UserProfile>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT p.id, p.username, p.full_name, p.email, p.phone, p.role, p.created_at, \
         p.updated_at FROM user_profiles p",
    );
    push_where(&mut query, filter);
    query.push(" ORDER BY p.full_name ASC");

    let rows = query
        .build_query_as::<DbUserProfile>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    convert_all(rows)
}

pub async fn get_profile_by_id(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<Option<UserProfile>> {
    let row = sqlx::query_as::<_, DbUserProfile>(
        r#"
        SELECT id, username, full_name, email, phone, role, created_at, updated_at
        FROM user_profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    row.map(UserProfile::try_from).transpose()
}

pub async fn create_profile(pool: &Pool<Postgres>, fields: &ProfileFields) -> MfcResult<UserProfile> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating profile: id={}, username={}", id, fields.username);

    let row = sqlx::query_as::<_, DbUserProfile>(
        r#"
        INSERT INTO user_profiles (id, username, full_name, email, phone, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING id, username, full_name, email, phone, role, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.username)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(fields.role.code())
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(write_error)?;

    UserProfile::try_from(row)
}

pub async fn update_profile(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &ProfileFields,
) -> MfcResult<Option<UserProfile>> {
    let row = sqlx::query_as::<_, DbUserProfile>(
        r#"
        UPDATE user_profiles
        SET username = $2, full_name = $3, email = $4, phone = $5, role = $6, updated_at = $7
        WHERE id = $1
        RETURNING id, username, full_name, email, phone, role, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&fields.username)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(fields.role.code())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
    .map_err(write_error)?;

    row.map(UserProfile::try_from).transpose()
}

/// Removes the profile together with its employee record and appointments. The
/// appointments are recorded in history before the cascade drops them.
pub async fn delete_profile(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let rows = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, user_profile_id, service_id, branch_id, status, visit_date, visit_time, created_at, updated_at
        FROM appointments
        WHERE user_profile_id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await
    .map_err(read_error)?;
    let appointments: Vec<Appointment> = convert_all(rows)?;

    let deleted = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(delete_error)?;
    if deleted.rows_affected() == 0 {
        return Ok(false);
    }

    for appointment in &appointments {
        history::record(
            &mut tx,
            AuditedEntity::Appointment,
            appointment.id,
            HistoryAction::Deleted,
            appointment,
            now,
        )
        .await?;
    }
    tx.commit().await.map_err(write_error)?;

    Ok(true)
}
