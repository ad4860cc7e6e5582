//! Field validation for write payloads. Each validator trims its inputs, collects
//! every problem into [`FieldErrors`] and only returns the writable fields when
//! nothing was found.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{FieldErrors, MfcError, MfcResult};
use crate::models::{
    appointment::AppointmentStatus,
    branch::{BranchFields, BranchRequest},
    employee::Position,
    profile::{ProfileFields, ProfileRequest, Role},
    service::{
        Category, DEFAULT_DURATION_DAYS, MAX_DURATION_DAYS, MIN_DURATION_DAYS, ServiceFields,
        ServiceRequest,
    },
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\+7|7|8)?[\s\-]?\(?[489][0-9]{2}\)?[\s\-]?[0-9]{3}[\s\-]?[0-9]{2}[\s\-]?[0-9]{2}$",
    )
    .expect("valid phone regex")
});

pub const NAME_MAX_CHARS: usize = 200;
pub const BRANCH_NAME_MIN_CHARS: usize = 3;
pub const ADDRESS_MIN_CHARS: usize = 10;
pub const SCHEDULE_MIN_CHARS: usize = 10;
pub const SERVICE_NAME_MIN_CHARS: usize = 5;
pub const PHONE_MAX_CHARS: usize = 20;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_branch(request: &BranchRequest) -> MfcResult<BranchFields> {
    let name = request.name.trim();
    let address = request.address.trim();
    let phone = request.phone.trim();
    let email = request.email.trim();
    let work_schedule = request.work_schedule.trim();

    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.add("name", "Branch name is required");
    } else if chars(name) < BRANCH_NAME_MIN_CHARS {
        errors.add("name", "Branch name must be at least 3 characters");
    } else if chars(name) > NAME_MAX_CHARS {
        errors.add("name", "Branch name must not exceed 200 characters");
    }

    if address.is_empty() {
        errors.add("address", "Address is required");
    } else if chars(address) < ADDRESS_MIN_CHARS {
        errors.add("address", "Address must be at least 10 characters");
    }

    if phone.is_empty() {
        errors.add("phone", "Phone is required");
    } else if !is_valid_phone(phone) {
        errors.add("phone", "Phone number has an invalid format");
    }

    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email address (e.g. office@mfc.ru)");
    }

    if work_schedule.is_empty() {
        errors.add("work_schedule", "Work schedule is required");
    } else if chars(work_schedule) < SCHEDULE_MIN_CHARS {
        errors.add("work_schedule", "Work schedule must contain a detailed description");
    }

    errors.into_result()?;

    Ok(BranchFields {
        name: name.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        work_schedule: work_schedule.to_string(),
        is_active: request.is_active.unwrap_or(true),
    })
}

pub fn validate_duration_range(days: i64, errors: &mut FieldErrors) -> Option<i32> {
    if days < i64::from(MIN_DURATION_DAYS) {
        errors.add("duration_days", "Duration cannot be less than 1 day");
        None
    } else if days > i64::from(MAX_DURATION_DAYS) {
        errors.add("duration_days", "Duration cannot exceed 365 days");
        None
    } else {
        i32::try_from(days).ok()
    }
}

pub fn validate_service(request: &ServiceRequest) -> MfcResult<ServiceFields> {
    let name = request.name.trim();
    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.add("name", "Service name is required");
    } else if chars(name) < SERVICE_NAME_MIN_CHARS {
        errors.add("name", "Service name must be at least 5 characters");
    } else if chars(name) > NAME_MAX_CHARS {
        errors.add("name", "Service name must not exceed 200 characters");
    }

    let category = match request.category.as_deref().map(str::trim) {
        None | Some("") => Some(Category::default()),
        Some(code) => {
            let category = Category::from_code(code);
            if category.is_none() {
                errors.add("category", format!("\"{code}\" is not a valid choice"));
            }
            category
        }
    };

    let duration_days = validate_duration_range(
        request
            .duration_days
            .unwrap_or(i64::from(DEFAULT_DURATION_DAYS)),
        &mut errors,
    );

    errors.into_result()?;

    match (category, duration_days) {
        (Some(category), Some(duration_days)) => Ok(ServiceFields {
            name: name.to_string(),
            category,
            duration_days,
        }),
        _ => Err(MfcError::validation("duration_days", "Invalid duration")),
    }
}

/// Interprets the loosely typed body of the duration update action.
pub fn parse_duration_value(raw: Option<&serde_json::Value>) -> MfcResult<i32> {
    use serde_json::Value;

    let days = match raw {
        None | Some(Value::Null) => {
            return Err(MfcError::validation(
                "duration_days",
                "New duration is not specified",
            ));
        }
        Some(Value::Number(n)) if n.as_i64() == Some(0) => {
            return Err(MfcError::validation(
                "duration_days",
                "New duration is not specified",
            ));
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(MfcError::validation(
                "duration_days",
                "New duration is not specified",
            ));
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    let Some(days) = days else {
        return Err(MfcError::validation(
            "duration_days",
            "Duration must be a number",
        ));
    };

    if !(i64::from(MIN_DURATION_DAYS)..=i64::from(MAX_DURATION_DAYS)).contains(&days) {
        return Err(MfcError::validation(
            "duration_days",
            "Duration must be between 1 and 365 days",
        ));
    }
    i32::try_from(days).map_err(|_| MfcError::validation("duration_days", "Duration must be a number"))
}

pub fn validate_profile(request: &ProfileRequest) -> MfcResult<ProfileFields> {
    let username = request.username.trim();
    let full_name = request.full_name.trim();
    let email = request.email.trim();
    let phone = request.phone.trim();
    let mut errors = FieldErrors::new();

    if username.is_empty() {
        errors.add("username", "Username is required");
    }

    if full_name.is_empty() {
        errors.add("full_name", "Full name is required");
    } else if chars(full_name) > NAME_MAX_CHARS {
        errors.add("full_name", "Full name must not exceed 200 characters");
    }

    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email address");
    }

    if chars(phone) > PHONE_MAX_CHARS {
        errors.add("phone", "Phone must not exceed 20 characters");
    }

    let role = parse_choice(request.role.as_deref(), "role", Role::from_code, &mut errors);

    errors.into_result()?;

    Ok(ProfileFields {
        username: username.to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        role: role.unwrap_or_default(),
    })
}

pub fn parse_position(raw: Option<&str>) -> MfcResult<Position> {
    let mut errors = FieldErrors::new();
    let position = parse_choice(raw, "position", Position::from_code, &mut errors);
    errors.into_result()?;
    Ok(position.unwrap_or_default())
}

pub fn parse_status(raw: Option<&str>) -> MfcResult<AppointmentStatus> {
    let mut errors = FieldErrors::new();
    let status = parse_choice(raw, "status", AppointmentStatus::from_code, &mut errors);
    errors.into_result()?;
    Ok(status.unwrap_or_default())
}

/// Absent or blank means "use the default"; anything else must be a known code.
fn parse_choice<T>(
    raw: Option<&str>,
    field: &str,
    from_code: impl Fn(&str) -> Option<T>,
    errors: &mut FieldErrors,
) -> Option<T> {
    let code = raw.map(str::trim).filter(|c| !c.is_empty())?;
    let parsed = from_code(code);
    if parsed.is_none() {
        errors.add(field, format!("\"{code}\" is not a valid choice"));
    }
    parsed
}
