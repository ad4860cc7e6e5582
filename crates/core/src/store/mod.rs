//! # Persistence boundary
//!
//! [`MfcStore`] is the only way the rules reach durable state. Implementations
//! must enforce the uniqueness and referential constraints themselves, atomically
//! with the write (unique index, or a single lock), and report them through
//! [`Violation`] so every backend produces identical errors:
//!
//! - branch email, service name, profile email, profile username, the
//!   (branch, service) pair and the employee's profile are unique;
//! - a branch with employees or appointments, and a service with appointments,
//!   cannot be deleted;
//! - creating an employee, or pointing one at another profile, sets that
//!   profile's role to `employee` in the same transaction;
//! - deleting a branch or service removes its availability links, deleting a
//!   profile removes its employee record and appointments;
//! - branch, service and appointment mutations append a [`HistoryEntry`].
//!
//! `update_*`, `set_*` and `delete_*` on an unknown id return `NotFound`.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{FieldErrors, MfcError, MfcResult, NON_FIELD_ERRORS};
use crate::filter::{
    AppointmentPredicate, BranchPredicate, BranchServicePredicate, BranchSort, EmployeePredicate,
    ProfilePredicate, ServicePredicate, ServiceSort,
};
use crate::models::{
    appointment::{Appointment, AppointmentFields},
    branch::{Branch, BranchFields},
    branch_service::{BranchService, BranchServiceFields},
    employee::{Employee, EmployeeFields},
    history::{AuditedEntity, HistoryEntry},
    profile::{ProfileFields, UserProfile},
    service::{Service, ServiceFields},
};

pub use memory::MemoryStore;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait MfcStore: Send + Sync {
    async fn list_branches(
        &self,
        filter: &BranchPredicate,
        sort: BranchSort,
    ) -> MfcResult<Vec<Branch>>;
    async fn get_branch(&self, id: Uuid) -> MfcResult<Option<Branch>>;
    async fn create_branch(&self, fields: &BranchFields) -> MfcResult<Branch>;
    async fn update_branch(&self, id: Uuid, fields: &BranchFields) -> MfcResult<Branch>;
    async fn set_branch_photo(&self, id: Uuid, photo: Option<String>) -> MfcResult<Branch>;
    async fn delete_branch(&self, id: Uuid) -> MfcResult<()>;

    async fn list_services(
        &self,
        filter: &ServicePredicate,
        sort: ServiceSort,
    ) -> MfcResult<Vec<Service>>;
    async fn get_service(&self, id: Uuid) -> MfcResult<Option<Service>>;
    async fn get_service_by_name(&self, name: &str) -> MfcResult<Option<Service>>;
    async fn create_service(&self, fields: &ServiceFields) -> MfcResult<Service>;
    async fn update_service(&self, id: Uuid, fields: &ServiceFields) -> MfcResult<Service>;
    async fn delete_service(&self, id: Uuid) -> MfcResult<()>;

    async fn list_branch_services(
        &self,
        filter: &BranchServicePredicate,
    ) -> MfcResult<Vec<BranchService>>;
    async fn get_branch_service(&self, id: Uuid) -> MfcResult<Option<BranchService>>;
    async fn create_branch_service(
        &self,
        fields: &BranchServiceFields,
    ) -> MfcResult<BranchService>;
    async fn set_service_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> MfcResult<BranchService>;
    async fn delete_branch_service(&self, id: Uuid) -> MfcResult<()>;

    async fn list_profiles(&self, filter: &ProfilePredicate) -> MfcResult<Vec<UserProfile>>;
    async fn get_profile(&self, id: Uuid) -> MfcResult<Option<UserProfile>>;
    async fn create_profile(&self, fields: &ProfileFields) -> MfcResult<UserProfile>;
    async fn update_profile(&self, id: Uuid, fields: &ProfileFields) -> MfcResult<UserProfile>;
    async fn delete_profile(&self, id: Uuid) -> MfcResult<()>;

    async fn list_employees(&self, filter: &EmployeePredicate) -> MfcResult<Vec<Employee>>;
    async fn get_employee(&self, id: Uuid) -> MfcResult<Option<Employee>>;
    async fn create_employee(&self, fields: &EmployeeFields) -> MfcResult<Employee>;
    async fn update_employee(&self, id: Uuid, fields: &EmployeeFields) -> MfcResult<Employee>;
    async fn delete_employee(&self, id: Uuid) -> MfcResult<()>;

    async fn list_appointments(
        &self,
        filter: &AppointmentPredicate,
    ) -> MfcResult<Vec<Appointment>>;
    async fn get_appointment(&self, id: Uuid) -> MfcResult<Option<Appointment>>;
    async fn create_appointment(&self, fields: &AppointmentFields) -> MfcResult<Appointment>;
    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> MfcResult<Appointment>;
    async fn delete_appointment(&self, id: Uuid) -> MfcResult<()>;

    async fn list_history(
        &self,
        entity: AuditedEntity,
        entity_id: Uuid,
    ) -> MfcResult<Vec<HistoryEntry>>;
}

/// Constraint violations a store can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    DuplicateBranchEmail,
    DuplicateServiceName,
    DuplicateProfileEmail,
    DuplicateUsername,
    DuplicateBranchService,
    DuplicateEmployeeProfile,
    /// A write referenced a record that does not exist; carries the field name.
    MissingReference(&'static str),
    BranchHasEmployees,
    BranchHasAppointments,
    ServiceHasAppointments,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Violation::DuplicateBranchEmail => "A branch with this email already exists",
            Violation::DuplicateServiceName => "A service with this name already exists",
            Violation::DuplicateProfileEmail => "A profile with this email already exists",
            Violation::DuplicateUsername => "This account already has a profile",
            Violation::DuplicateBranchService => "This service is already linked to the branch",
            Violation::DuplicateEmployeeProfile => "This profile already has an employee record",
            Violation::MissingReference(_) => "Referenced record does not exist",
            Violation::BranchHasEmployees => {
                "Cannot delete the branch because employees are assigned to it"
            }
            Violation::BranchHasAppointments => {
                "Cannot delete the branch because appointments reference it"
            }
            Violation::ServiceHasAppointments => {
                "Cannot delete the service because appointments reference it"
            }
        }
    }

    fn field(self) -> Option<&'static str> {
        match self {
            Violation::DuplicateBranchEmail | Violation::DuplicateProfileEmail => Some("email"),
            Violation::DuplicateServiceName => Some("name"),
            Violation::DuplicateUsername => Some("username"),
            Violation::DuplicateBranchService => Some(NON_FIELD_ERRORS),
            Violation::DuplicateEmployeeProfile => Some("user_profile_id"),
            Violation::MissingReference(field) => Some(field),
            Violation::BranchHasEmployees
            | Violation::BranchHasAppointments
            | Violation::ServiceHasAppointments => None,
        }
    }
}

impl From<Violation> for MfcError {
    fn from(violation: Violation) -> Self {
        match violation.field() {
            Some(field) => MfcError::Validation(FieldErrors::single(field, violation.message())),
            None => MfcError::Conflict(violation.message().to_string()),
        }
    }
}
