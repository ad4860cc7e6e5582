//! # Predicate builder
//!
//! Search endpoints compose their filters from optional parameters. A
//! [`Predicate`] starts [`Empty`](Predicate::Empty) and clauses are conjoined,
//! disjoined or negated only when the corresponding parameter is present, so an
//! absent parameter never constrains the result.
//!
//! `Empty` is the identity of both `and` and `or`: `Empty.or(x)` is `x`, not
//! "everything". Evaluated on its own it matches every record.
//!
//! The same tree is evaluated in memory through [`Matches`] and rendered to SQL by
//! the persistence layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    appointment::{Appointment, AppointmentStatus},
    branch::Branch,
    branch_service::BranchService,
    employee::{Employee, Position},
    profile::{Role, UserProfile},
    service::{Category, Service},
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Predicate<C> {
    #[default]
    Empty,
    Clause(C),
    And(Box<Predicate<C>>, Box<Predicate<C>>),
    Or(Box<Predicate<C>>, Box<Predicate<C>>),
    Not(Box<Predicate<C>>),
}

impl<C> Predicate<C> {
    pub fn empty() -> Self {
        Predicate::Empty
    }

    pub fn clause(clause: C) -> Self {
        Predicate::Clause(clause)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    pub fn and(self, other: Predicate<C>) -> Self {
        match (self, other) {
            (Predicate::Empty, other) => other,
            (this, Predicate::Empty) => this,
            (this, other) => Predicate::And(Box::new(this), Box::new(other)),
        }
    }

    pub fn or(self, other: Predicate<C>) -> Self {
        match (self, other) {
            (Predicate::Empty, other) => other,
            (this, Predicate::Empty) => this,
            (this, other) => Predicate::Or(Box::new(this), Box::new(other)),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Predicate::Empty => Predicate::Empty,
            this => Predicate::Not(Box::new(this)),
        }
    }

    /// Conjoins the clause built from `value` when it is present.
    pub fn and_some<T>(self, value: Option<T>, build: impl FnOnce(T) -> C) -> Self {
        match value {
            Some(value) => self.and(Predicate::Clause(build(value))),
            None => self,
        }
    }

    /// Conjoins the disjunction of every clause in `clauses`; nothing when empty.
    pub fn and_any_of(self, clauses: impl IntoIterator<Item = C>) -> Self {
        let any = clauses
            .into_iter()
            .fold(Predicate::Empty, |acc, c| acc.or(Predicate::Clause(c)));
        self.and(any)
    }

    pub fn evaluate<R>(&self, record: &R) -> bool
    where
        C: Matches<R>,
    {
        match self {
            Predicate::Empty => true,
            Predicate::Clause(clause) => clause.matches(record),
            Predicate::And(a, b) => a.evaluate(record) && b.evaluate(record),
            Predicate::Or(a, b) => a.evaluate(record) || b.evaluate(record),
            Predicate::Not(inner) => !inner.evaluate(record),
        }
    }
}

/// A single filter condition that can be checked against a record.
pub trait Matches<R> {
    fn matches(&self, record: &R) -> bool;
}

/// Case-insensitive substring test.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchClause {
    NameContains(String),
    AddressContains(String),
    EmailContains(String),
    PhoneContains(String),
    Active(bool),
    CreatedSince(DateTime<Utc>),
}

impl Matches<Branch> for BranchClause {
    fn matches(&self, branch: &Branch) -> bool {
        match self {
            BranchClause::NameContains(s) => icontains(&branch.name, s),
            BranchClause::AddressContains(s) => icontains(&branch.address, s),
            BranchClause::EmailContains(s) => icontains(&branch.email, s),
            BranchClause::PhoneContains(s) => icontains(&branch.phone, s),
            BranchClause::Active(active) => branch.is_active == *active,
            BranchClause::CreatedSince(since) => branch.created_at >= *since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceClause {
    NameContains(String),
    Category(Category),
    DurationAtMost(i32),
}

impl Matches<Service> for ServiceClause {
    fn matches(&self, service: &Service) -> bool {
        match self {
            ServiceClause::NameContains(s) => icontains(&service.name, s),
            ServiceClause::Category(category) => service.category == *category,
            ServiceClause::DurationAtMost(days) => service.duration_days <= *days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchServiceClause {
    Branch(Uuid),
    Service(Uuid),
    Available(bool),
}

impl Matches<BranchService> for BranchServiceClause {
    fn matches(&self, link: &BranchService) -> bool {
        match self {
            BranchServiceClause::Branch(id) => link.branch_id == *id,
            BranchServiceClause::Service(id) => link.service_id == *id,
            BranchServiceClause::Available(available) => link.is_available == *available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileClause {
    FullNameContains(String),
    EmailContains(String),
    PhoneContains(String),
    UsernameContains(String),
    Role(Role),
}

impl Matches<UserProfile> for ProfileClause {
    fn matches(&self, profile: &UserProfile) -> bool {
        match self {
            ProfileClause::FullNameContains(s) => icontains(&profile.full_name, s),
            ProfileClause::EmailContains(s) => icontains(&profile.email, s),
            ProfileClause::PhoneContains(s) => icontains(&profile.phone, s),
            ProfileClause::UsernameContains(s) => icontains(&profile.username, s),
            ProfileClause::Role(role) => profile.role == *role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EmployeeClause {
    Office(Uuid),
    Position(Position),
    Profile(Uuid),
}

impl Matches<Employee> for EmployeeClause {
    fn matches(&self, employee: &Employee) -> bool {
        match self {
            EmployeeClause::Office(id) => employee.office_id == *id,
            EmployeeClause::Position(position) => employee.position == *position,
            EmployeeClause::Profile(id) => employee.user_profile_id == *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppointmentClause {
    Status(AppointmentStatus),
    Branch(Uuid),
    Service(Uuid),
    Profile(Uuid),
    Date(NaiveDate),
}

impl Matches<Appointment> for AppointmentClause {
    fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentClause::Status(status) => appointment.status == *status,
            AppointmentClause::Branch(id) => appointment.branch_id == *id,
            AppointmentClause::Service(id) => appointment.service_id == *id,
            AppointmentClause::Profile(id) => appointment.user_profile_id == *id,
            AppointmentClause::Date(date) => appointment.date == *date,
        }
    }
}

pub type BranchPredicate = Predicate<BranchClause>;
pub type ServicePredicate = Predicate<ServiceClause>;
pub type BranchServicePredicate = Predicate<BranchServiceClause>;
pub type ProfilePredicate = Predicate<ProfileClause>;
pub type EmployeePredicate = Predicate<EmployeeClause>;
pub type AppointmentPredicate = Predicate<AppointmentClause>;

/// A requested sort column plus direction. Ties are always broken by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort<F> {
    pub field: F,
    pub descending: bool,
}

impl<F: SortField> Sort<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    /// Parses `field` or `-field`; unknown fields yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (name, descending) = match raw.strip_prefix('-') {
            Some(name) => (name, true),
            None => (raw, false),
        };
        F::from_name(name).map(|field| Self { field, descending })
    }
}

pub trait SortField: Sized + Copy {
    fn from_name(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchSortField {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortField for BranchSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(BranchSortField::Name),
            "created_at" => Some(BranchSortField::CreatedAt),
            "updated_at" => Some(BranchSortField::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceSortField {
    Name,
    Category,
    DurationDays,
    CreatedAt,
}

impl SortField for ServiceSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(ServiceSortField::Name),
            "category" => Some(ServiceSortField::Category),
            "duration_days" => Some(ServiceSortField::DurationDays),
            "created_at" => Some(ServiceSortField::CreatedAt),
            _ => None,
        }
    }
}

pub type BranchSort = Sort<BranchSortField>;
pub type ServiceSort = Sort<ServiceSortField>;

impl Default for BranchSort {
    fn default() -> Self {
        Sort::ascending(BranchSortField::Name)
    }
}

impl Default for ServiceSort {
    fn default() -> Self {
        Sort::ascending(ServiceSortField::Name)
    }
}
