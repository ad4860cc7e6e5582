use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical service office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Storage handle of the uploaded photo, if any.
    pub photo: Option<String>,
    pub work_schedule: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable branch columns, already validated and trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchFields {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub work_schedule: String,
    pub is_active: bool,
}

impl From<&Branch> for BranchFields {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            address: branch.address.clone(),
            phone: branch.phone.clone(),
            email: branch.email.clone(),
            work_schedule: branch.work_schedule.clone(),
            is_active: branch.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub work_schedule: String,
    pub is_active: Option<bool>,
}

/// API representation of a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub phone_display: String,
    pub email: String,
    pub photo: Option<String>,
    pub photo_url: Option<String>,
    pub work_schedule: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchEnvelope {
    pub message: String,
    pub branch: BranchResponse,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
