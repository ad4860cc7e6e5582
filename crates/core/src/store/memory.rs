//! In-process [`MfcStore`]. Every operation runs under one lock, which makes each
//! check-and-write atomic the same way a transaction does for the SQL store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::eyre;
use serde::Serialize;
use uuid::Uuid;

use super::{MfcStore, Violation};
use crate::errors::{MfcError, MfcResult};
use crate::filter::{
    AppointmentPredicate, BranchPredicate, BranchServicePredicate, BranchSort, BranchSortField,
    EmployeePredicate, ProfilePredicate, ServicePredicate, ServiceSort, ServiceSortField,
};
use crate::models::{
    appointment::{Appointment, AppointmentFields},
    branch::{Branch, BranchFields},
    branch_service::{BranchService, BranchServiceFields},
    employee::{Employee, EmployeeFields},
    history::{AuditedEntity, HistoryAction, HistoryEntry},
    profile::{ProfileFields, Role, UserProfile},
    service::{Service, ServiceFields},
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
struct Link {
    id: Uuid,
    branch_id: Uuid,
    service_id: Uuid,
    is_available: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    branches: HashMap<Uuid, Branch>,
    services: HashMap<Uuid, Service>,
    links: HashMap<Uuid, Link>,
    profiles: HashMap<Uuid, UserProfile>,
    employees: HashMap<Uuid, Employee>,
    appointments: HashMap<Uuid, Appointment>,
    history: Vec<HistoryEntry>,
}

impl Tables {
    fn record<T: Serialize>(
        &mut self,
        entity: AuditedEntity,
        entity_id: Uuid,
        action: HistoryAction,
        snapshot: &T,
        now: DateTime<Utc>,
    ) -> MfcResult<()> {
        let snapshot =
            serde_json::to_value(snapshot).map_err(|e| MfcError::Internal(Box::new(e)))?;
        self.history.push(HistoryEntry {
            id: Uuid::new_v4(),
            entity,
            entity_id,
            action,
            snapshot,
            recorded_at: now,
        });
        Ok(())
    }

    fn joined(&self, link: &Link) -> BranchService {
        BranchService {
            id: link.id,
            branch_id: link.branch_id,
            branch_name: self
                .branches
                .get(&link.branch_id)
                .map(|b| b.name.clone())
                .unwrap_or_default(),
            service_id: link.service_id,
            service_name: self
                .services
                .get(&link.service_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            is_available: link.is_available,
            updated_at: link.updated_at,
        }
    }

    fn promote_to_employee(&mut self, profile_id: Uuid, now: DateTime<Utc>) -> MfcResult<()> {
        let profile = self
            .profiles
            .get_mut(&profile_id)
            .ok_or(Violation::MissingReference("user_profile_id"))?;
        if profile.role != Role::Employee {
            profile.role = Role::Employee;
            profile.updated_at = now;
        }
        Ok(())
    }

    fn check_employee_refs(
        &self,
        fields: &EmployeeFields,
        current: Option<Uuid>,
    ) -> MfcResult<()> {
        if !self.profiles.contains_key(&fields.user_profile_id) {
            return Err(Violation::MissingReference("user_profile_id").into());
        }
        if !self.branches.contains_key(&fields.office_id) {
            return Err(Violation::MissingReference("office_id").into());
        }
        let taken = self
            .employees
            .values()
            .any(|e| e.user_profile_id == fields.user_profile_id && Some(e.id) != current);
        if taken {
            return Err(Violation::DuplicateEmployeeProfile.into());
        }
        Ok(())
    }

    fn check_appointment_refs(&self, fields: &AppointmentFields) -> MfcResult<()> {
        if !self.profiles.contains_key(&fields.user_profile_id) {
            return Err(Violation::MissingReference("user_profile_id").into());
        }
        if !self.services.contains_key(&fields.service_id) {
            return Err(Violation::MissingReference("service_id").into());
        }
        if !self.branches.contains_key(&fields.branch_id) {
            return Err(Violation::MissingReference("branch_id").into());
        }
        Ok(())
    }

    fn check_profile_unique(&self, fields: &ProfileFields, current: Option<Uuid>) -> MfcResult<()> {
        let others = || self.profiles.values().filter(move |p| Some(p.id) != current);
        if others().any(|p| p.username == fields.username) {
            return Err(Violation::DuplicateUsername.into());
        }
        if others().any(|p| p.email == fields.email) {
            return Err(Violation::DuplicateProfileEmail.into());
        }
        Ok(())
    }
}

/// Keeps every table in process memory. Used by tests and local tooling.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Uses `clock` for every timestamp the store assigns.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    fn tables(&self) -> MfcResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| MfcError::Database(eyre!("memory store lock poisoned")))
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

fn sort_branches(branches: &mut [Branch], sort: BranchSort) {
    branches.sort_by(|a, b| {
        let primary = match sort.field {
            BranchSortField::Name => by_name(&a.name, &b.name),
            BranchSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            BranchSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let primary = if sort.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| by_name(&a.name, &b.name))
    });
}

fn sort_services(services: &mut [Service], sort: ServiceSort) {
    services.sort_by(|a, b| {
        let primary = match sort.field {
            ServiceSortField::Name => by_name(&a.name, &b.name),
            ServiceSortField::Category => a.category.code().cmp(b.category.code()),
            ServiceSortField::DurationDays => a.duration_days.cmp(&b.duration_days),
            ServiceSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = if sort.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| by_name(&a.name, &b.name))
    });
}

#[async_trait]
impl MfcStore for MemoryStore {
    async fn list_branches(
        &self,
        filter: &BranchPredicate,
        sort: BranchSort,
    ) -> MfcResult<Vec<Branch>> {
        let tables = self.tables()?;
        let mut branches: Vec<Branch> = tables
            .branches
            .values()
            .filter(|b| filter.evaluate(*b))
            .cloned()
            .collect();
        sort_branches(&mut branches, sort);
        Ok(branches)
    }

    async fn get_branch(&self, id: Uuid) -> MfcResult<Option<Branch>> {
        Ok(self.tables()?.branches.get(&id).cloned())
    }

    async fn create_branch(&self, fields: &BranchFields) -> MfcResult<Branch> {
        let now = self.now();
        let mut tables = self.tables()?;
        if tables.branches.values().any(|b| b.email == fields.email) {
            return Err(Violation::DuplicateBranchEmail.into());
        }

        let branch = Branch {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            address: fields.address.clone(),
            phone: fields.phone.clone(),
            email: fields.email.clone(),
            photo: None,
            work_schedule: fields.work_schedule.clone(),
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.record(AuditedEntity::Branch, branch.id, HistoryAction::Created, &branch, now)?;
        tables.branches.insert(branch.id, branch.clone());
        Ok(branch)
    }

    async fn update_branch(&self, id: Uuid, fields: &BranchFields) -> MfcResult<Branch> {
        let now = self.now();
        let mut tables = self.tables()?;
        if tables
            .branches
            .values()
            .any(|b| b.id != id && b.email == fields.email)
        {
            return Err(Violation::DuplicateBranchEmail.into());
        }

        let branch = tables
            .branches
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Branch", id))?;
        branch.name = fields.name.clone();
        branch.address = fields.address.clone();
        branch.phone = fields.phone.clone();
        branch.email = fields.email.clone();
        branch.work_schedule = fields.work_schedule.clone();
        branch.is_active = fields.is_active;
        branch.updated_at = now;
        let branch = branch.clone();

        tables.record(AuditedEntity::Branch, id, HistoryAction::Updated, &branch, now)?;
        Ok(branch)
    }

    async fn set_branch_photo(&self, id: Uuid, photo: Option<String>) -> MfcResult<Branch> {
        let now = self.now();
        let mut tables = self.tables()?;
        let branch = tables
            .branches
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Branch", id))?;
        branch.photo = photo;
        branch.updated_at = now;
        let branch = branch.clone();

        tables.record(AuditedEntity::Branch, id, HistoryAction::Updated, &branch, now)?;
        Ok(branch)
    }

    async fn delete_branch(&self, id: Uuid) -> MfcResult<()> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.branches.contains_key(&id) {
            return Err(MfcError::not_found("Branch", id));
        }
        if tables.employees.values().any(|e| e.office_id == id) {
            return Err(Violation::BranchHasEmployees.into());
        }
        if tables.appointments.values().any(|a| a.branch_id == id) {
            return Err(Violation::BranchHasAppointments.into());
        }

        tables.links.retain(|_, link| link.branch_id != id);
        if let Some(branch) = tables.branches.remove(&id) {
            tables.record(AuditedEntity::Branch, id, HistoryAction::Deleted, &branch, now)?;
        }
        Ok(())
    }

    async fn list_services(
        &self,
        filter: &ServicePredicate,
        sort: ServiceSort,
    ) -> MfcResult<Vec<Service>> {
        let tables = self.tables()?;
        let mut services: Vec<Service> = tables
            .services
            .values()
            .filter(|s| filter.evaluate(*s))
            .cloned()
            .collect();
        sort_services(&mut services, sort);
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> MfcResult<Option<Service>> {
        Ok(self.tables()?.services.get(&id).cloned())
    }

    async fn get_service_by_name(&self, name: &str) -> MfcResult<Option<Service>> {
        Ok(self
            .tables()?
            .services
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn create_service(&self, fields: &ServiceFields) -> MfcResult<Service> {
        let now = self.now();
        let mut tables = self.tables()?;
        if tables.services.values().any(|s| s.name == fields.name) {
            return Err(Violation::DuplicateServiceName.into());
        }

        let service = Service {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            category: fields.category,
            duration_days: fields.duration_days,
            created_at: now,
            updated_at: now,
        };
        tables.record(AuditedEntity::Service, service.id, HistoryAction::Created, &service, now)?;
        tables.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(&self, id: Uuid, fields: &ServiceFields) -> MfcResult<Service> {
        let now = self.now();
        let mut tables = self.tables()?;
        if tables
            .services
            .values()
            .any(|s| s.id != id && s.name == fields.name)
        {
            return Err(Violation::DuplicateServiceName.into());
        }

        let service = tables
            .services
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Service", id))?;
        service.name = fields.name.clone();
        service.category = fields.category;
        service.duration_days = fields.duration_days;
        service.updated_at = now;
        let service = service.clone();

        tables.record(AuditedEntity::Service, id, HistoryAction::Updated, &service, now)?;
        Ok(service)
    }

    async fn delete_service(&self, id: Uuid) -> MfcResult<()> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.services.contains_key(&id) {
            return Err(MfcError::not_found("Service", id));
        }
        if tables.appointments.values().any(|a| a.service_id == id) {
            return Err(Violation::ServiceHasAppointments.into());
        }

        tables.links.retain(|_, link| link.service_id != id);
        if let Some(service) = tables.services.remove(&id) {
            tables.record(AuditedEntity::Service, id, HistoryAction::Deleted, &service, now)?;
        }
        Ok(())
    }

    async fn list_branch_services(
        &self,
        filter: &BranchServicePredicate,
    ) -> MfcResult<Vec<BranchService>> {
        let tables = self.tables()?;
        let mut links: Vec<BranchService> = tables
            .links
            .values()
            .map(|link| tables.joined(link))
            .filter(|link| filter.evaluate(link))
            .collect();
        links.sort_by(|a, b| {
            by_name(&a.branch_name, &b.branch_name)
                .then_with(|| by_name(&a.service_name, &b.service_name))
        });
        Ok(links)
    }

    async fn get_branch_service(&self, id: Uuid) -> MfcResult<Option<BranchService>> {
        let tables = self.tables()?;
        Ok(tables.links.get(&id).map(|link| tables.joined(link)))
    }

    async fn create_branch_service(
        &self,
        fields: &BranchServiceFields,
    ) -> MfcResult<BranchService> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.branches.contains_key(&fields.branch_id) {
            return Err(Violation::MissingReference("branch_id").into());
        }
        if !tables.services.contains_key(&fields.service_id) {
            return Err(Violation::MissingReference("service_id").into());
        }
        if tables
            .links
            .values()
            .any(|l| l.branch_id == fields.branch_id && l.service_id == fields.service_id)
        {
            return Err(Violation::DuplicateBranchService.into());
        }

        let link = Link {
            id: Uuid::new_v4(),
            branch_id: fields.branch_id,
            service_id: fields.service_id,
            is_available: fields.is_available,
            updated_at: now,
        };
        let joined = tables.joined(&link);
        tables.links.insert(link.id, link);
        Ok(joined)
    }

    async fn set_service_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> MfcResult<BranchService> {
        let now = self.now();
        let mut tables = self.tables()?;
        let link = tables
            .links
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Branch service", id))?;
        link.is_available = available;
        link.updated_at = now;
        let link = link.clone();
        Ok(tables.joined(&link))
    }

    async fn delete_branch_service(&self, id: Uuid) -> MfcResult<()> {
        self.tables()?
            .links
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| MfcError::not_found("Branch service", id))
    }

    async fn list_profiles(&self, filter: &ProfilePredicate) -> MfcResult<Vec<UserProfile>> {
        let tables = self.tables()?;
        let mut profiles: Vec<UserProfile> = tables
            .profiles
            .values()
            .filter(|p| filter.evaluate(*p))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| by_name(&a.full_name, &b.full_name));
        Ok(profiles)
    }

    async fn get_profile(&self, id: Uuid) -> MfcResult<Option<UserProfile>> {
        Ok(self.tables()?.profiles.get(&id).cloned())
    }

    async fn create_profile(&self, fields: &ProfileFields) -> MfcResult<UserProfile> {
        let now = self.now();
        let mut tables = self.tables()?;
        tables.check_profile_unique(fields, None)?;

        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: fields.username.clone(),
            full_name: fields.full_name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            role: fields.role,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, fields: &ProfileFields) -> MfcResult<UserProfile> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.profiles.contains_key(&id) {
            return Err(MfcError::not_found("Profile", id));
        }
        tables.check_profile_unique(fields, Some(id))?;

        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Profile", id))?;
        profile.username = fields.username.clone();
        profile.full_name = fields.full_name.clone();
        profile.email = fields.email.clone();
        profile.phone = fields.phone.clone();
        profile.role = fields.role;
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> MfcResult<()> {
        let now = self.now();
        let mut tables = self.tables()?;
        if tables.profiles.remove(&id).is_none() {
            return Err(MfcError::not_found("Profile", id));
        }

        tables.employees.retain(|_, e| e.user_profile_id != id);
        let removed: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.user_profile_id == id)
            .cloned()
            .collect();
        for appointment in removed {
            tables.appointments.remove(&appointment.id);
            tables.record(
                AuditedEntity::Appointment,
                appointment.id,
                HistoryAction::Deleted,
                &appointment,
                now,
            )?;
        }
        Ok(())
    }

    async fn list_employees(&self, filter: &EmployeePredicate) -> MfcResult<Vec<Employee>> {
        let tables = self.tables()?;
        let full_name = |e: &Employee| {
            tables
                .profiles
                .get(&e.user_profile_id)
                .map(|p| p.full_name.clone())
                .unwrap_or_default()
        };
        let mut employees: Vec<Employee> = tables
            .employees
            .values()
            .filter(|e| filter.evaluate(*e))
            .cloned()
            .collect();
        employees.sort_by_key(full_name);
        Ok(employees)
    }

    async fn get_employee(&self, id: Uuid) -> MfcResult<Option<Employee>> {
        Ok(self.tables()?.employees.get(&id).cloned())
    }

    async fn create_employee(&self, fields: &EmployeeFields) -> MfcResult<Employee> {
        let now = self.now();
        let mut tables = self.tables()?;
        tables.check_employee_refs(fields, None)?;

        let employee = Employee {
            id: Uuid::new_v4(),
            user_profile_id: fields.user_profile_id,
            office_id: fields.office_id,
            position: fields.position,
            created_at: now,
            updated_at: now,
        };
        tables.promote_to_employee(fields.user_profile_id, now)?;
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, id: Uuid, fields: &EmployeeFields) -> MfcResult<Employee> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.employees.contains_key(&id) {
            return Err(MfcError::not_found("Employee", id));
        }
        tables.check_employee_refs(fields, Some(id))?;
        tables.promote_to_employee(fields.user_profile_id, now)?;

        let employee = tables
            .employees
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Employee", id))?;
        employee.user_profile_id = fields.user_profile_id;
        employee.office_id = fields.office_id;
        employee.position = fields.position;
        employee.updated_at = now;
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: Uuid) -> MfcResult<()> {
        self.tables()?
            .employees
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| MfcError::not_found("Employee", id))
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentPredicate,
    ) -> MfcResult<Vec<Appointment>> {
        let tables = self.tables()?;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| filter.evaluate(*a))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> MfcResult<Option<Appointment>> {
        Ok(self.tables()?.appointments.get(&id).cloned())
    }

    async fn create_appointment(&self, fields: &AppointmentFields) -> MfcResult<Appointment> {
        let now = self.now();
        let mut tables = self.tables()?;
        tables.check_appointment_refs(fields)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_profile_id: fields.user_profile_id,
            service_id: fields.service_id,
            branch_id: fields.branch_id,
            status: fields.status,
            date: fields.date,
            time: fields.time,
            created_at: now,
            updated_at: now,
        };
        tables.record(
            AuditedEntity::Appointment,
            appointment.id,
            HistoryAction::Created,
            &appointment,
            now,
        )?;
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> MfcResult<Appointment> {
        let now = self.now();
        let mut tables = self.tables()?;
        if !tables.appointments.contains_key(&id) {
            return Err(MfcError::not_found("Appointment", id));
        }
        tables.check_appointment_refs(fields)?;

        let appointment = tables
            .appointments
            .get_mut(&id)
            .ok_or_else(|| MfcError::not_found("Appointment", id))?;
        appointment.user_profile_id = fields.user_profile_id;
        appointment.service_id = fields.service_id;
        appointment.branch_id = fields.branch_id;
        appointment.status = fields.status;
        appointment.date = fields.date;
        appointment.time = fields.time;
        appointment.updated_at = now;
        let appointment = appointment.clone();

        tables.record(
            AuditedEntity::Appointment,
            id,
            HistoryAction::Updated,
            &appointment,
            now,
        )?;
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: Uuid) -> MfcResult<()> {
        let now = self.now();
        let mut tables = self.tables()?;
        let appointment = tables
            .appointments
            .remove(&id)
            .ok_or_else(|| MfcError::not_found("Appointment", id))?;
        tables.record(
            AuditedEntity::Appointment,
            id,
            HistoryAction::Deleted,
            &appointment,
            now,
        )
    }

    async fn list_history(
        &self,
        entity: AuditedEntity,
        entity_id: Uuid,
    ) -> MfcResult<Vec<HistoryEntry>> {
        let tables = self.tables()?;
        let mut entries: Vec<HistoryEntry> = tables
            .history
            .iter()
            .rev()
            .filter(|h| h.entity == entity && h.entity_id == entity_id)
            .cloned()
            .collect();
        // Stable, so equal timestamps stay newest-inserted first.
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }
}
