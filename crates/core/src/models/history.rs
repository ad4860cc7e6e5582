use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entities whose mutations are recorded in the change history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditedEntity {
    Branch,
    Service,
    Appointment,
}

impl AuditedEntity {
    pub fn code(self) -> &'static str {
        match self {
            AuditedEntity::Branch => "branch",
            AuditedEntity::Service => "service",
            AuditedEntity::Appointment => "appointment",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "branch" => Some(AuditedEntity::Branch),
            "service" => Some(AuditedEntity::Service),
            "appointment" => Some(AuditedEntity::Appointment),
            _ => None,
        }
    }
}

impl fmt::Display for AuditedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

impl HistoryAction {
    pub fn code(self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Deleted => "deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(HistoryAction::Created),
            "updated" => Some(HistoryAction::Updated),
            "deleted" => Some(HistoryAction::Deleted),
            _ => None,
        }
    }
}

/// One recorded change: the full record state right after the mutation
/// (right before it, for deletions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub entity: AuditedEntity,
    pub entity_id: Uuid,
    pub action: HistoryAction,
    pub snapshot: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}
