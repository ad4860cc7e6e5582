//! PostgreSQL implementation of [`MfcStore`]. Constraints are enforced by the
//! schema's unique indexes and foreign keys; each write runs in one transaction.

use async_trait::async_trait;
use mfc_core::errors::{MfcError, MfcResult};
use mfc_core::filter::{
    AppointmentPredicate, BranchPredicate, BranchServicePredicate, BranchSort, EmployeePredicate,
    ProfilePredicate, ServicePredicate, ServiceSort,
};
use mfc_core::models::{
    appointment::{Appointment, AppointmentFields},
    branch::{Branch, BranchFields},
    branch_service::{BranchService, BranchServiceFields},
    employee::{Employee, EmployeeFields},
    history::{AuditedEntity, HistoryEntry},
    profile::{ProfileFields, UserProfile},
    service::{Service, ServiceFields},
};
use mfc_core::store::MfcStore;
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{
    appointment, branch, branch_service, employee, history, profile, service,
};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn found<T>(entity: &str, id: Uuid, value: Option<T>) -> MfcResult<T> {
    value.ok_or_else(|| MfcError::not_found(entity, id))
}

fn deleted(entity: &str, id: Uuid, removed: bool) -> MfcResult<()> {
    if removed {
        Ok(())
    } else {
        Err(MfcError::not_found(entity, id))
    }
}

#[async_trait]
impl MfcStore for PgStore {
    async fn list_branches(
        &self,
        filter: &BranchPredicate,
        sort: BranchSort,
    ) -> MfcResult<Vec<Branch>> {
        branch::list_branches(&self.pool, filter, sort).await
    }

    async fn get_branch(&self, id: Uuid) -> MfcResult<Option<Branch>> {
        branch::get_branch_by_id(&self.pool, id).await
    }

    async fn create_branch(&self, fields: &BranchFields) -> MfcResult<Branch> {
        branch::create_branch(&self.pool, fields).await
    }

    async fn update_branch(&self, id: Uuid, fields: &BranchFields) -> MfcResult<Branch> {
        found("Branch", id, branch::update_branch(&self.pool, id, fields).await?)
    }

    async fn set_branch_photo(&self, id: Uuid, photo: Option<String>) -> MfcResult<Branch> {
        let updated = branch::set_branch_photo(&self.pool, id, photo.as_deref()).await?;
        found("Branch", id, updated)
    }

    async fn delete_branch(&self, id: Uuid) -> MfcResult<()> {
        deleted("Branch", id, branch::delete_branch(&self.pool, id).await?)
    }

    async fn list_services(
        &self,
        filter: &ServicePredicate,
        sort: ServiceSort,
    ) -> MfcResult<Vec<Service>> {
        service::list_services(&self.pool, filter, sort).await
    }

    async fn get_service(&self, id: Uuid) -> MfcResult<Option<Service>> {
        service::get_service_by_id(&self.pool, id).await
    }

    async fn get_service_by_name(&self, name: &str) -> MfcResult<Option<Service>> {
        service::get_service_by_name(&self.pool, name).await
    }

    async fn create_service(&self, fields: &ServiceFields) -> MfcResult<Service> {
        service::create_service(&self.pool, fields).await
    }

    async fn update_service(&self, id: Uuid, fields: &ServiceFields) -> MfcResult<Service> {
        found("Service", id, service::update_service(&self.pool, id, fields).await?)
    }

    async fn delete_service(&self, id: Uuid) -> MfcResult<()> {
        deleted("Service", id, service::delete_service(&self.pool, id).await?)
    }

    async fn list_branch_services(
        &self,
        filter: &BranchServicePredicate,
    ) -> MfcResult<Vec<BranchService>> {
        branch_service::list_branch_services(&self.pool, filter).await
    }

    async fn get_branch_service(&self, id: Uuid) -> MfcResult<Option<BranchService>> {
        branch_service::get_branch_service_by_id(&self.pool, id).await
    }

    async fn create_branch_service(
        &self,
        fields: &BranchServiceFields,
    ) -> MfcResult<BranchService> {
        branch_service::create_branch_service(&self.pool, fields).await
    }

    async fn set_service_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> MfcResult<BranchService> {
        let updated = branch_service::set_availability(&self.pool, id, available).await?;
        found("Branch service", id, updated)
    }

    async fn delete_branch_service(&self, id: Uuid) -> MfcResult<()> {
        let removed = branch_service::delete_branch_service(&self.pool, id).await?;
        deleted("Branch service", id, removed)
    }

    async fn list_profiles(&self, filter: &ProfilePredicate) -> MfcResult<Vec<UserProfile>> {
        profile::list_profiles(&self.pool, filter).await
    }

    async fn get_profile(&self, id: Uuid) -> MfcResult<Option<UserProfile>> {
        profile::get_profile_by_id(&self.pool, id).await
    }

    async fn create_profile(&self, fields: &ProfileFields) -> MfcResult<UserProfile> {
        profile::create_profile(&self.pool, fields).await
    }

    async fn update_profile(&self, id: Uuid, fields: &ProfileFields) -> MfcResult<UserProfile> {
        found("Profile", id, profile::update_profile(&self.pool, id, fields).await?)
    }

    async fn delete_profile(&self, id: Uuid) -> MfcResult<()> {
        deleted("Profile", id, profile::delete_profile(&self.pool, id).await?)
    }

    async fn list_employees(&self, filter: &EmployeePredicate) -> MfcResult<Vec<Employee>> {
        employee::list_employees(&self.pool, filter).await
    }

    async fn get_employee(&self, id: Uuid) -> MfcResult<Option<Employee>> {
        employee::get_employee_by_id(&self.pool, id).await
    }

    async fn create_employee(&self, fields: &EmployeeFields) -> MfcResult<Employee> {
        employee::create_employee(&self.pool, fields).await
    }

    async fn update_employee(&self, id: Uuid, fields: &EmployeeFields) -> MfcResult<Employee> {
        found("Employee", id, employee::update_employee(&self.pool, id, fields).await?)
    }

    async fn delete_employee(&self, id: Uuid) -> MfcResult<()> {
        deleted("Employee", id, employee::delete_employee(&self.pool, id).await?)
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentPredicate,
    ) -> MfcResult<Vec<Appointment>> {
        appointment::list_appointments(&self.pool, filter).await
    }

    async fn get_appointment(&self, id: Uuid) -> MfcResult<Option<Appointment>> {
        appointment::get_appointment_by_id(&self.pool, id).await
    }

    async fn create_appointment(&self, fields: &AppointmentFields) -> MfcResult<Appointment> {
        appointment::create_appointment(&self.pool, fields).await
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> MfcResult<Appointment> {
        let updated = appointment::update_appointment(&self.pool, id, fields).await?;
        found("Appointment", id, updated)
    }

    async fn delete_appointment(&self, id: Uuid) -> MfcResult<()> {
        deleted("Appointment", id, appointment::delete_appointment(&self.pool, id).await?)
    }

    async fn list_history(
        &self,
        entity: AuditedEntity,
        entity_id: Uuid,
    ) -> MfcResult<Vec<HistoryEntry>> {
        history::list_history(&self.pool, entity, entity_id).await
    }
}
