use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::eyre;
use mfc_core::errors::MfcError;
use mfc_core::models::{
    appointment::{Appointment, AppointmentStatus},
    branch::Branch,
    branch_service::BranchService,
    employee::{Employee, Position},
    history::{AuditedEntity, HistoryAction, HistoryEntry},
    profile::{Role, UserProfile},
    service::{Category, Service},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored codes are written by this crate only, so an unknown one means the
/// table was edited by hand.
fn decode<T>(column: &str, code: &str, from_code: impl Fn(&str) -> Option<T>) -> Result<T, MfcError> {
    from_code(code).ok_or_else(|| MfcError::Database(eyre!("unknown {column} code {code:?}")))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBranch {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub photo: Option<String>,
    pub work_schedule: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbBranch> for Branch {
    fn from(row: DbBranch) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            photo: row.photo,
            work_schedule: row.work_schedule,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbService> for Service {
    type Error = MfcError;

    fn try_from(row: DbService) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            category: decode("category", &row.category, Category::from_code)?,
            duration_days: row.duration_days,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBranchService {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<DbBranchService> for BranchService {
    fn from(row: DbBranchService) -> Self {
        Self {
            id: row.id,
            branch_id: row.branch_id,
            branch_name: row.branch_name,
            service_id: row.service_id,
            service_name: row.service_name,
            is_available: row.is_available,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUserProfile> for UserProfile {
    type Error = MfcError;

    fn try_from(row: DbUserProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            role: decode("role", &row.role, Role::from_code)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEmployee {
    pub id: Uuid,
    pub user_profile_id: Uuid,
    pub office_id: Uuid,
    pub position: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbEmployee> for Employee {
    type Error = MfcError;

    fn try_from(row: DbEmployee) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_profile_id: row.user_profile_id,
            office_id: row.office_id,
            position: decode("position", &row.position, Position::from_code)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_profile_id: Uuid,
    pub service_id: Uuid,
    pub branch_id: Uuid,
    pub status: String,
    pub visit_date: NaiveDate,
    pub visit_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = MfcError;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_profile_id: row.user_profile_id,
            service_id: row.service_id,
            branch_id: row.branch_id,
            status: decode("status", &row.status, AppointmentStatus::from_code)?,
            date: row.visit_date,
            time: row.visit_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbHistoryEntry {
    pub id: Uuid,
    pub entity: String,
    pub entity_id: Uuid,
    pub action: String,
    pub snapshot: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<DbHistoryEntry> for HistoryEntry {
    type Error = MfcError;

    fn try_from(row: DbHistoryEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            entity: decode("entity", &row.entity, AuditedEntity::from_code)?,
            entity_id: row.entity_id,
            action: decode("action", &row.action, HistoryAction::from_code)?,
            snapshot: row.snapshot,
            recorded_at: row.recorded_at,
        })
    }
}

/// Converts a batch of rows, failing on the first undecodable one.
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, MfcError>
where
    T: TryFrom<R, Error = MfcError>,
{
    rows.into_iter().map(T::try_from).collect()
}
