//! # Consistency rules
//!
//! Every write goes through here: payloads are validated, referenced records are
//! checked, and only then is the store called. Constraints that must hold under
//! concurrent writers (uniqueness, delete protection, the employee role cascade)
//! are enforced atomically by the store itself; the checks here only produce
//! friendlier errors for the common case.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{FieldErrors, MfcError, MfcResult};
use crate::models::{
    appointment::{Appointment, AppointmentFields, AppointmentRequest, AppointmentStatus},
    branch::{Branch, BranchFields, BranchRequest},
    branch_service::{BranchService, BranchServiceFields, LinkServiceRequest},
    employee::{Employee, EmployeeFields, EmployeeRequest},
    profile::{ProfileRequest, UserProfile},
    service::{Service, ServiceFields, ServiceRequest},
};
use crate::storage::{MAX_PHOTO_BYTES, PhotoStorage, branch_photo_destination};
use crate::store::MfcStore;
use crate::validation::{
    parse_duration_value, parse_position, parse_status, validate_branch, validate_profile,
    validate_service,
};

const DOES_NOT_EXIST: &str = "Referenced record does not exist";
pub const PHOTO_TOO_LARGE: &str = "Photo is too large (maximum 5MB).";

pub async fn get_branch(store: &dyn MfcStore, id: Uuid) -> MfcResult<Branch> {
    store
        .get_branch(id)
        .await?
        .ok_or_else(|| MfcError::not_found("Branch", id))
}

pub async fn create_branch(store: &dyn MfcStore, request: &BranchRequest) -> MfcResult<Branch> {
    let fields = validate_branch(request)?;
    let branch = store.create_branch(&fields).await?;
    info!(branch_id = %branch.id, name = %branch.name, "branch created");
    Ok(branch)
}

/// Full update. An omitted `is_active` keeps the current value.
pub async fn update_branch(
    store: &dyn MfcStore,
    id: Uuid,
    request: &BranchRequest,
) -> MfcResult<Branch> {
    let current = get_branch(store, id).await?;
    let mut fields = validate_branch(request)?;
    fields.is_active = request.is_active.unwrap_or(current.is_active);

    let branch = store.update_branch(id, &fields).await?;
    info!(branch_id = %id, "branch updated");
    Ok(branch)
}

pub async fn toggle_branch_active(store: &dyn MfcStore, id: Uuid) -> MfcResult<Branch> {
    let current = get_branch(store, id).await?;
    let mut fields = BranchFields::from(&current);
    fields.is_active = !current.is_active;

    let branch = store.update_branch(id, &fields).await?;
    info!(branch_id = %id, is_active = branch.is_active, "branch activity toggled");
    Ok(branch)
}

/// Result of a photo upload. An oversized upload is not an error: the branch is
/// returned unchanged with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoOutcome {
    pub branch: Branch,
    pub warnings: Vec<String>,
}

pub async fn attach_branch_photo(
    store: &dyn MfcStore,
    photos: &dyn PhotoStorage,
    id: Uuid,
    file_name: &str,
    bytes: &[u8],
) -> MfcResult<PhotoOutcome> {
    let branch = get_branch(store, id).await?;

    if bytes.is_empty() {
        return Err(MfcError::validation("photo", "The submitted file is empty"));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        warn!(branch_id = %id, size = bytes.len(), "photo upload rejected: too large");
        return Ok(PhotoOutcome {
            branch,
            warnings: vec![PHOTO_TOO_LARGE.to_string()],
        });
    }

    if let Some(old) = &branch.photo {
        photos.delete(old).await?;
    }
    let handle = photos.store(bytes, &branch_photo_destination(file_name)).await?;

    match store.set_branch_photo(id, Some(handle.clone())).await {
        Ok(branch) => {
            info!(branch_id = %id, photo = %handle, "branch photo attached");
            Ok(PhotoOutcome {
                branch,
                warnings: Vec::new(),
            })
        }
        Err(err) => {
            if let Err(cleanup) = photos.delete(&handle).await {
                warn!(photo = %handle, error = %cleanup, "failed to remove orphaned photo");
            }
            Err(err)
        }
    }
}

pub async fn clear_branch_photo(
    store: &dyn MfcStore,
    photos: &dyn PhotoStorage,
    id: Uuid,
) -> MfcResult<Branch> {
    let branch = get_branch(store, id).await?;
    let Some(handle) = branch.photo.clone() else {
        return Ok(branch);
    };

    photos.delete(&handle).await?;
    let branch = store.set_branch_photo(id, None).await?;
    info!(branch_id = %id, "branch photo cleared");
    Ok(branch)
}

/// Deletes the branch and then releases its photo. A refused delete leaves the
/// photo in place; a failed release after a successful delete only logs.
pub async fn delete_branch(
    store: &dyn MfcStore,
    photos: &dyn PhotoStorage,
    id: Uuid,
) -> MfcResult<Branch> {
    let branch = get_branch(store, id).await?;
    store.delete_branch(id).await?;

    if let Some(handle) = &branch.photo {
        if let Err(err) = photos.delete(handle).await {
            warn!(branch_id = %id, photo = %handle, error = %err, "failed to release branch photo");
        }
    }
    info!(branch_id = %id, name = %branch.name, "branch deleted");
    Ok(branch)
}

pub async fn get_service(store: &dyn MfcStore, id: Uuid) -> MfcResult<Service> {
    store
        .get_service(id)
        .await?
        .ok_or_else(|| MfcError::not_found("Service", id))
}

pub async fn create_service(store: &dyn MfcStore, request: &ServiceRequest) -> MfcResult<Service> {
    let fields = validate_service(request)?;
    let service = store.create_service(&fields).await?;
    info!(service_id = %service.id, name = %service.name, "service created");
    Ok(service)
}

pub async fn update_service(
    store: &dyn MfcStore,
    id: Uuid,
    request: &ServiceRequest,
) -> MfcResult<Service> {
    let current = get_service(store, id).await?;
    let mut fields = validate_service(request)?;
    if request
        .category
        .as_deref()
        .map(str::trim)
        .is_none_or(str::is_empty)
    {
        fields.category = current.category;
    }
    if request.duration_days.is_none() {
        fields.duration_days = current.duration_days;
    }
    let service = store.update_service(id, &fields).await?;
    info!(service_id = %id, "service updated");
    Ok(service)
}

pub async fn update_service_duration(
    store: &dyn MfcStore,
    id: Uuid,
    raw: Option<&serde_json::Value>,
) -> MfcResult<Service> {
    let current = get_service(store, id).await?;
    let duration_days = parse_duration_value(raw)?;

    let fields = ServiceFields {
        duration_days,
        ..ServiceFields::from(&current)
    };
    let service = store.update_service(id, &fields).await?;
    info!(service_id = %id, duration_days, "service duration changed");
    Ok(service)
}

pub async fn delete_service(store: &dyn MfcStore, id: Uuid) -> MfcResult<Service> {
    let service = get_service(store, id).await?;
    store.delete_service(id).await?;
    info!(service_id = %id, name = %service.name, "service deleted");
    Ok(service)
}

pub async fn link_service(
    store: &dyn MfcStore,
    request: &LinkServiceRequest,
) -> MfcResult<BranchService> {
    let mut errors = FieldErrors::new();
    if store.get_branch(request.branch_id).await?.is_none() {
        errors.add("branch_id", DOES_NOT_EXIST);
    }
    if store.get_service(request.service_id).await?.is_none() {
        errors.add("service_id", DOES_NOT_EXIST);
    }
    errors.into_result()?;

    let link = store
        .create_branch_service(&BranchServiceFields {
            branch_id: request.branch_id,
            service_id: request.service_id,
            is_available: request.is_available.unwrap_or(true),
        })
        .await?;
    info!(branch_id = %link.branch_id, service_id = %link.service_id, "service linked to branch");
    Ok(link)
}

pub async fn set_service_availability(
    store: &dyn MfcStore,
    id: Uuid,
    available: bool,
) -> MfcResult<BranchService> {
    store.set_service_availability(id, available).await
}

pub async fn unlink_service(store: &dyn MfcStore, id: Uuid) -> MfcResult<()> {
    store.delete_branch_service(id).await?;
    info!(link_id = %id, "service unlinked from branch");
    Ok(())
}

pub async fn get_profile(store: &dyn MfcStore, id: Uuid) -> MfcResult<UserProfile> {
    store
        .get_profile(id)
        .await?
        .ok_or_else(|| MfcError::not_found("Profile", id))
}

pub async fn create_profile(
    store: &dyn MfcStore,
    request: &ProfileRequest,
) -> MfcResult<UserProfile> {
    let fields = validate_profile(request)?;
    let profile = store.create_profile(&fields).await?;
    info!(profile_id = %profile.id, role = %profile.role, "profile created");
    Ok(profile)
}

pub async fn update_profile(
    store: &dyn MfcStore,
    id: Uuid,
    request: &ProfileRequest,
) -> MfcResult<UserProfile> {
    let current = get_profile(store, id).await?;
    let mut fields = validate_profile(request)?;
    if request.role.is_none() {
        fields.role = current.role;
    }
    store.update_profile(id, &fields).await
}

pub async fn delete_profile(store: &dyn MfcStore, id: Uuid) -> MfcResult<()> {
    store.delete_profile(id).await?;
    info!(profile_id = %id, "profile deleted");
    Ok(())
}

async fn employee_fields(
    store: &dyn MfcStore,
    request: &EmployeeRequest,
) -> MfcResult<EmployeeFields> {
    let position = parse_position(request.position.as_deref())?;

    let mut errors = FieldErrors::new();
    if store.get_profile(request.user_profile_id).await?.is_none() {
        errors.add("user_profile_id", DOES_NOT_EXIST);
    }
    if store.get_branch(request.office_id).await?.is_none() {
        errors.add("office_id", DOES_NOT_EXIST);
    }
    errors.into_result()?;

    Ok(EmployeeFields {
        user_profile_id: request.user_profile_id,
        office_id: request.office_id,
        position,
    })
}

pub async fn get_employee(store: &dyn MfcStore, id: Uuid) -> MfcResult<Employee> {
    store
        .get_employee(id)
        .await?
        .ok_or_else(|| MfcError::not_found("Employee", id))
}

/// Creates the employee record; the store promotes the linked profile to the
/// employee role in the same transaction.
pub async fn hire_employee(store: &dyn MfcStore, request: &EmployeeRequest) -> MfcResult<Employee> {
    let fields = employee_fields(store, request).await?;
    let employee = store.create_employee(&fields).await?;
    info!(
        employee_id = %employee.id,
        profile_id = %employee.user_profile_id,
        office_id = %employee.office_id,
        "employee hired"
    );
    Ok(employee)
}

pub async fn update_employee(
    store: &dyn MfcStore,
    id: Uuid,
    request: &EmployeeRequest,
) -> MfcResult<Employee> {
    get_employee(store, id).await?;
    let fields = employee_fields(store, request).await?;
    store.update_employee(id, &fields).await
}

pub async fn dismiss_employee(store: &dyn MfcStore, id: Uuid) -> MfcResult<()> {
    store.delete_employee(id).await?;
    info!(employee_id = %id, "employee dismissed");
    Ok(())
}

/// Whether appointment status changes must follow the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionPolicy {
    /// Any status may be set directly.
    #[default]
    Permissive,
    Enforced,
}

impl TransitionPolicy {
    pub fn check(self, from: AppointmentStatus, to: AppointmentStatus) -> MfcResult<()> {
        if self == TransitionPolicy::Enforced && !from.can_transition_to(to) {
            return Err(MfcError::validation(
                "status",
                format!("Cannot change status from {from} to {to}"),
            ));
        }
        Ok(())
    }
}

async fn appointment_fields(
    store: &dyn MfcStore,
    request: &AppointmentRequest,
) -> MfcResult<AppointmentFields> {
    let status = parse_status(request.status.as_deref())?;

    let mut errors = FieldErrors::new();
    if store.get_profile(request.user_profile_id).await?.is_none() {
        errors.add("user_profile_id", DOES_NOT_EXIST);
    }
    if store.get_service(request.service_id).await?.is_none() {
        errors.add("service_id", DOES_NOT_EXIST);
    }
    if store.get_branch(request.branch_id).await?.is_none() {
        errors.add("branch_id", DOES_NOT_EXIST);
    }
    errors.into_result()?;

    Ok(AppointmentFields {
        user_profile_id: request.user_profile_id,
        service_id: request.service_id,
        branch_id: request.branch_id,
        status,
        date: request.date,
        time: request.time,
    })
}

pub async fn get_appointment(store: &dyn MfcStore, id: Uuid) -> MfcResult<Appointment> {
    store
        .get_appointment(id)
        .await?
        .ok_or_else(|| MfcError::not_found("Appointment", id))
}

pub async fn book_appointment(
    store: &dyn MfcStore,
    request: &AppointmentRequest,
) -> MfcResult<Appointment> {
    let fields = appointment_fields(store, request).await?;
    let appointment = store.create_appointment(&fields).await?;
    info!(appointment_id = %appointment.id, status = %appointment.status, "appointment booked");
    Ok(appointment)
}

/// Full update. An omitted status keeps the current one.
pub async fn update_appointment(
    store: &dyn MfcStore,
    policy: TransitionPolicy,
    id: Uuid,
    request: &AppointmentRequest,
) -> MfcResult<Appointment> {
    let current = get_appointment(store, id).await?;
    let mut fields = appointment_fields(store, request).await?;
    if request.status.is_none() {
        fields.status = current.status;
    }
    policy.check(current.status, fields.status)?;
    store.update_appointment(id, &fields).await
}

pub async fn change_appointment_status(
    store: &dyn MfcStore,
    policy: TransitionPolicy,
    id: Uuid,
    raw_status: &str,
) -> MfcResult<Appointment> {
    let current = get_appointment(store, id).await?;
    let status = parse_status(Some(raw_status))?;
    policy.check(current.status, status)?;

    let fields = AppointmentFields {
        status,
        user_profile_id: current.user_profile_id,
        service_id: current.service_id,
        branch_id: current.branch_id,
        date: current.date,
        time: current.time,
    };
    let appointment = store.update_appointment(id, &fields).await?;
    info!(appointment_id = %id, from = %current.status, to = %status, "appointment status changed");
    Ok(appointment)
}

pub async fn delete_appointment(store: &dyn MfcStore, id: Uuid) -> MfcResult<()> {
    store.delete_appointment(id).await?;
    info!(appointment_id = %id, "appointment deleted");
    Ok(())
}
