use chrono::{DateTime, Utc};
use mfc_core::errors::MfcResult;
use mfc_core::filter::EmployeePredicate;
use mfc_core::models::{
    employee::{Employee, EmployeeFields},
    profile::Role,
};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{read_error, write_error};
use crate::filter::push_where;
use crate::models::{DbEmployee, convert_all};

pub async fn list_employees(
    pool: &Pool<Postgres>,
    filter: &EmployeePredicate,
) -> MfcResult<Vec<Employee>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT e.id, e.user_profile_id, e.office_id, e.position, e.created_at, e.updated_at \
         FROM employees e JOIN user_profiles p ON p.id = e.user_profile_id",
    );
    push_where(&mut query, filter);
    query.push(" ORDER BY p.full_name ASC");

    let rows = query
        .build_query_as::<DbEmployee>()
        .fetch_all(pool)
        .await
        .map_err(read_error)?;

    convert_all(rows)
}

pub async fn get_employee_by_id(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<Option<Employee>> {
    let row = sqlx::query_as::<_, DbEmployee>(
        r#"
        SELECT id, user_profile_id, office_id, position, created_at, updated_at
        FROM employees
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(read_error)?;

    row.map(Employee::try_from).transpose()
}

async fn promote_to_employee(
    conn: &mut PgConnection,
    profile_id: Uuid,
    now: DateTime<Utc>,
) -> MfcResult<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET role = $2, updated_at = $3
        WHERE id = $1 AND role <> $2
        "#,
    )
    .bind(profile_id)
    .bind(Role::Employee.code())
    .bind(now)
    .execute(conn)
    .await
    .map_err(write_error)?;

    Ok(())
}

/// Inserts the employee and promotes its profile in one transaction.
pub async fn create_employee(pool: &Pool<Postgres>, fields: &EmployeeFields) -> MfcResult<Employee> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating employee: id={}, user_profile_id={}, office_id={}",
        id, fields.user_profile_id, fields.office_id
    );

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbEmployee>(
        r#"
        INSERT INTO employees (id, user_profile_id, office_id, position, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, user_profile_id, office_id, position, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(fields.user_profile_id)
    .bind(fields.office_id)
    .bind(fields.position.code())
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(write_error)?;

    promote_to_employee(&mut tx, fields.user_profile_id, now).await?;
    tx.commit().await.map_err(write_error)?;

    Employee::try_from(row)
}

pub async fn update_employee(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &EmployeeFields,
) -> MfcResult<Option<Employee>> {
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(read_error)?;
    let row = sqlx::query_as::<_, DbEmployee>(
        r#"
        UPDATE employees
        SET user_profile_id = $2, office_id = $3, position = $4, updated_at = $5
        WHERE id = $1
        RETURNING id, user_profile_id, office_id, position, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(fields.user_profile_id)
    .bind(fields.office_id)
    .bind(fields.position.code())
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(write_error)?;

    let Some(row) = row else {
        return Ok(None);
    };
    promote_to_employee(&mut tx, fields.user_profile_id, now).await?;
    tx.commit().await.map_err(write_error)?;

    Employee::try_from(row).map(Some)
}

pub async fn delete_employee(pool: &Pool<Postgres>, id: Uuid) -> MfcResult<bool> {
    let deleted = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(write_error)?;

    Ok(deleted.rows_affected() > 0)
}
