//! Search presets: raw query parameters in, predicates out.
//!
//! Every parameter arrives as an optional string. Values that fail to parse are
//! ignored exactly like absent ones.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{
    AppointmentClause, AppointmentPredicate, BranchClause, BranchPredicate, BranchServiceClause,
    BranchServicePredicate, BranchSort, EmployeeClause, EmployeePredicate, Predicate,
    ProfileClause, ProfilePredicate, ServiceClause, ServicePredicate, ServiceSort,
    ServiceSortField, Sort,
};
use crate::models::{
    appointment::AppointmentStatus, employee::Position, profile::Role, service::Category,
};

/// Branches whose email contains this marker never show up in complex search.
pub const EXCLUDED_EMAIL_MARKER: &str = "test";
/// Services whose name contains this marker are never offered as fast.
pub const TEMPORARY_SERVICE_MARKER: &str = "temporary";
pub const FAST_SERVICE_MAX_DAYS: i32 = 3;
/// Branch export covers branches created within this many days.
pub const BRANCH_EXPORT_WINDOW_DAYS: i64 = 5;
pub const SERVICE_EXPORT_CATEGORIES: [Category; 3] =
    [Category::Documents, Category::Transport, Category::Social];

/// Lenient boolean parsing for filter parameters.
pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_uuid(raw: Option<&str>) -> Option<Uuid> {
    non_blank(raw).and_then(|s| Uuid::parse_str(s).ok())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchListQuery {
    pub is_active: Option<String>,
    pub ordering: Option<String>,
}

impl BranchListQuery {
    pub fn predicate(&self) -> BranchPredicate {
        Predicate::empty().and_some(parse_flag(self.is_active.as_deref()), BranchClause::Active)
    }

    pub fn sort(&self) -> BranchSort {
        self.ordering
            .as_deref()
            .and_then(Sort::parse)
            .unwrap_or_default()
    }
}

pub fn active_branches() -> BranchPredicate {
    Predicate::clause(BranchClause::Active(true))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexSearchQuery {
    pub query: Option<String>,
    pub active: Option<String>,
}

impl ComplexSearchQuery {
    /// `(name OR address contains query) AND active AND NOT email contains marker`,
    /// with each part present only when its parameter is.
    pub fn predicate(&self) -> BranchPredicate {
        let mut predicate = Predicate::empty();

        if let Some(query) = non_blank(self.query.as_deref()) {
            predicate = predicate
                .or(Predicate::clause(BranchClause::NameContains(query.to_string())))
                .or(Predicate::clause(BranchClause::AddressContains(query.to_string())));
        }

        let active_only = self
            .active
            .as_deref()
            .is_some_and(|a| a.to_lowercase() == "true");
        if active_only {
            predicate = predicate.and(Predicate::clause(BranchClause::Active(true)));
        }

        predicate.and(
            Predicate::clause(BranchClause::EmailContains(EXCLUDED_EMAIL_MARKER.to_string()))
                .negate(),
        )
    }
}

pub fn branch_export(now: DateTime<Utc>) -> BranchPredicate {
    Predicate::clause(BranchClause::CreatedSince(
        now - Duration::days(BRANCH_EXPORT_WINDOW_DAYS),
    ))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl ServiceListQuery {
    pub fn predicate(&self) -> ServicePredicate {
        let category = non_blank(self.category.as_deref()).and_then(Category::from_code);
        Predicate::empty()
            .and_some(category, ServiceClause::Category)
            .and_some(non_blank(self.search.as_deref()), |s| {
                ServiceClause::NameContains(s.to_string())
            })
    }

    pub fn sort(&self) -> ServiceSort {
        self.ordering
            .as_deref()
            .and_then(Sort::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FastServicesQuery {
    pub max_days: Option<String>,
}

impl FastServicesQuery {
    pub fn predicate(&self) -> ServicePredicate {
        let max_days = non_blank(self.max_days.as_deref()).and_then(|s| s.parse::<i32>().ok());

        Predicate::empty()
            .and_some(max_days, ServiceClause::DurationAtMost)
            .and_any_of([
                ServiceClause::Category(Category::Documents),
                ServiceClause::Category(Category::Transport),
                ServiceClause::DurationAtMost(FAST_SERVICE_MAX_DAYS),
            ])
            .and(
                Predicate::clause(ServiceClause::NameContains(
                    TEMPORARY_SERVICE_MARKER.to_string(),
                ))
                .negate(),
            )
    }
}

pub fn service_export() -> (ServicePredicate, ServiceSort) {
    let predicate =
        Predicate::empty().and_any_of(SERVICE_EXPORT_CATEGORIES.map(ServiceClause::Category));
    (predicate, Sort::ascending(ServiceSortField::Category))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchServiceListQuery {
    pub branch: Option<String>,
    pub service: Option<String>,
    pub available: Option<String>,
}

impl BranchServiceListQuery {
    pub fn predicate(&self) -> BranchServicePredicate {
        Predicate::empty()
            .and_some(parse_uuid(self.branch.as_deref()), BranchServiceClause::Branch)
            .and_some(parse_uuid(self.service.as_deref()), BranchServiceClause::Service)
            .and_some(
                parse_flag(self.available.as_deref()),
                BranchServiceClause::Available,
            )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

impl ProfileListQuery {
    pub fn predicate(&self) -> ProfilePredicate {
        let role = non_blank(self.role.as_deref()).and_then(Role::from_code);
        let mut predicate = Predicate::empty().and_some(role, ProfileClause::Role);

        if let Some(term) = non_blank(self.search.as_deref()) {
            predicate = predicate.and_any_of([
                ProfileClause::FullNameContains(term.to_string()),
                ProfileClause::EmailContains(term.to_string()),
                ProfileClause::PhoneContains(term.to_string()),
                ProfileClause::UsernameContains(term.to_string()),
            ]);
        }
        predicate
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeListQuery {
    pub office: Option<String>,
    pub position: Option<String>,
}

impl EmployeeListQuery {
    pub fn predicate(&self) -> EmployeePredicate {
        let position = non_blank(self.position.as_deref()).and_then(Position::from_code);
        Predicate::empty()
            .and_some(parse_uuid(self.office.as_deref()), EmployeeClause::Office)
            .and_some(position, EmployeeClause::Position)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<String>,
    pub branch: Option<String>,
    pub service: Option<String>,
    pub user_profile: Option<String>,
    pub date: Option<String>,
}

impl AppointmentListQuery {
    pub fn predicate(&self) -> AppointmentPredicate {
        let status = non_blank(self.status.as_deref()).and_then(AppointmentStatus::from_code);
        let date = non_blank(self.date.as_deref())
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

        Predicate::empty()
            .and_some(status, AppointmentClause::Status)
            .and_some(parse_uuid(self.branch.as_deref()), AppointmentClause::Branch)
            .and_some(parse_uuid(self.service.as_deref()), AppointmentClause::Service)
            .and_some(parse_uuid(self.user_profile.as_deref()), AppointmentClause::Profile)
            .and_some(date, AppointmentClause::Date)
    }
}
