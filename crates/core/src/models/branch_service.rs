use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability of a service at a branch. Names are joined for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchService {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchServiceFields {
    pub branch_id: Uuid,
    pub service_id: Uuid,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkServiceRequest {
    pub branch_id: Uuid,
    pub service_id: Uuid,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}
