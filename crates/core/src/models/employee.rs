use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Specialist,
    Consultant,
    Admin,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Specialist, Position::Consultant, Position::Admin];

    pub fn code(self) -> &'static str {
        match self {
            Position::Specialist => "specialist",
            Position::Consultant => "consultant",
            Position::Admin => "admin",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Specialist => "Reception specialist",
            Position::Consultant => "Consultant",
            Position::Admin => "Branch administrator",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A staff member, linked 1:1 to a profile and to exactly one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub user_profile_id: Uuid,
    pub office_id: Uuid,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFields {
    pub user_profile_id: Uuid,
    pub office_id: Uuid,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    pub user_profile_id: Uuid,
    pub office_id: Uuid,
    pub position: Option<String>,
}
