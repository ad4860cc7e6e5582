use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service categories. The set is closed; the code is what gets stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "DOC")]
    Documents,
    #[serde(rename = "PROP")]
    Property,
    #[serde(rename = "TRANS")]
    Transport,
    #[serde(rename = "SOC")]
    Social,
    #[serde(rename = "BUS")]
    Business,
    #[serde(rename = "HLTH")]
    Health,
    #[serde(rename = "EDU")]
    Education,
    #[serde(rename = "OTHER")]
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Documents,
        Category::Property,
        Category::Transport,
        Category::Social,
        Category::Business,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::Documents => "DOC",
            Category::Property => "PROP",
            Category::Transport => "TRANS",
            Category::Social => "SOC",
            Category::Business => "BUS",
            Category::Health => "HLTH",
            Category::Education => "EDU",
            Category::Other => "OTHER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Declared display text.
    pub fn label(self) -> &'static str {
        match self {
            Category::Documents => "Documents and certificates",
            Category::Property => "Real estate and land",
            Category::Transport => "Transport and driving licences",
            Category::Social => "Social services",
            Category::Business => "Business and entrepreneurship",
            Category::Health => "Healthcare",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub const DEFAULT_DURATION_DAYS: i32 = 14;
pub const MIN_DURATION_DAYS: i32 = 1;
pub const MAX_DURATION_DAYS: i32 = 365;

/// A procedure offered to the public.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub name: String,
    pub category: Category,
    pub duration_days: i32,
}

impl From<&Service> for ServiceFields {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            category: service.category,
            duration_days: service.duration_days,
        }
    }
}

/// Category arrives as a raw code so an unknown value becomes a field error
/// instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    pub duration_days: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDurationRequest {
    pub duration_days: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub category_display: String,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            category: service.category,
            category_display: service.category.label().to_string(),
            duration_days: service.duration_days,
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEnvelope {
    pub message: String,
    pub service: ServiceResponse,
}
