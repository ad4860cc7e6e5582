//! Presentation adapters. These build external representations of stored records
//! and never touch the records themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    branch::{Branch, BranchResponse},
    service::{Category, Service},
};

pub const ADDRESS_PREVIEW_CHARS: usize = 15;
pub const TRUNCATION_MARKER: &str = "...";

/// Normalizes a stored phone number to `+7XXXXXXXXXX` where the shape allows it.
/// Lengths are counted in characters.
pub fn format_phone(phone: &str) -> String {
    let len = phone.chars().count();

    if len >= 11 {
        if let Some(rest) = phone.strip_prefix('8') {
            return format!("+7{rest}");
        }
        if phone.starts_with('7') {
            return format!("+{phone}");
        }
    }
    if !phone.starts_with('+') && len >= 10 {
        return format!("+7{phone}");
    }
    phone.to_string()
}

/// Completion-time bucket. Boundaries are inclusive: 3 is fast, 7 is medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationTier {
    Fast,
    Medium,
    Slow,
}

impl DurationTier {
    pub fn of(duration_days: i32) -> Self {
        if duration_days <= 3 {
            DurationTier::Fast
        } else if duration_days <= 7 {
            DurationTier::Medium
        } else {
            DurationTier::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationTier::Fast => "Fast (≤ 3 days)",
            DurationTier::Medium => "Medium (4-7 days)",
            DurationTier::Slow => "Slow (> 7 days)",
        }
    }
}

/// Short export names for a few categories; the rest use their display text.
pub fn category_export_label(category: Category) -> &'static str {
    match category {
        Category::Documents => "Documents",
        Category::Transport => "Transport",
        Category::Social => "Social services",
        other => other.label(),
    }
}

pub fn truncate_address(address: &str) -> String {
    let address = address.trim();
    if address.chars().count() > ADDRESS_PREVIEW_CHARS {
        let preview: String = address.chars().take(ADDRESS_PREVIEW_CHARS).collect();
        format!("{preview}{TRUNCATION_MARKER}")
    } else {
        address.to_string()
    }
}

pub fn active_label(is_active: bool) -> &'static str {
    if is_active { "Active" } else { "Inactive" }
}

/// Builds the API representation; `photo_url` resolves a storage handle.
pub fn branch_response(branch: Branch, photo_url: impl Fn(&str) -> String) -> BranchResponse {
    let photo_url = branch.photo.as_deref().map(photo_url);
    BranchResponse {
        id: branch.id,
        phone_display: format_phone(&branch.phone),
        name: branch.name,
        address: branch.address,
        phone: branch.phone,
        email: branch.email,
        photo: branch.photo,
        photo_url,
        work_schedule: branch.work_schedule,
        is_active: branch.is_active,
        created_at: branch.created_at,
        updated_at: branch.updated_at,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchExportRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub work_schedule: String,
    pub is_active: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Branch> for BranchExportRow {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            address: truncate_address(&branch.address),
            phone: format_phone(&branch.phone),
            email: branch.email.clone(),
            work_schedule: branch.work_schedule.clone(),
            is_active: active_label(branch.is_active).to_string(),
            created_at: branch.created_at,
            updated_at: branch.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceExportRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub duration_days: i32,
    pub duration_assessment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Service> for ServiceExportRow {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            category: category_export_label(service.category).to_string(),
            duration_days: service.duration_days,
            duration_assessment: DurationTier::of(service.duration_days).label().to_string(),
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}
