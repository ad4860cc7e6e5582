pub mod appointment;
pub mod branch;
pub mod branch_service;
pub mod employee;
pub mod history;
pub mod profile;
pub mod service;

use eyre::Report;
use mfc_core::errors::MfcError;
use mfc_core::store::Violation;
use sqlx::error::ErrorKind;

/// What the failing statement was doing. The same foreign key means a missing
/// reference on insert and a protected dependent on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Write,
    Delete,
}

pub fn constraint_violation(constraint: &str, statement: Statement) -> Option<Violation> {
    let violation = match (constraint, statement) {
        ("uq_branches_email", _) => Violation::DuplicateBranchEmail,
        ("uq_services_name", _) => Violation::DuplicateServiceName,
        ("uq_user_profiles_email", _) => Violation::DuplicateProfileEmail,
        ("uq_user_profiles_username", _) => Violation::DuplicateUsername,
        ("uq_branch_services_pair", _) => Violation::DuplicateBranchService,
        ("uq_employees_user_profile", _) => Violation::DuplicateEmployeeProfile,
        ("fk_employees_office", Statement::Delete) => Violation::BranchHasEmployees,
        ("fk_appointments_branch", Statement::Delete) => Violation::BranchHasAppointments,
        ("fk_appointments_service", Statement::Delete) => Violation::ServiceHasAppointments,
        ("fk_employees_office", Statement::Write) => Violation::MissingReference("office_id"),
        ("fk_appointments_branch" | "fk_branch_services_branch", Statement::Write) => {
            Violation::MissingReference("branch_id")
        }
        ("fk_appointments_service" | "fk_branch_services_service", Statement::Write) => {
            Violation::MissingReference("service_id")
        }
        ("fk_employees_user_profile" | "fk_appointments_user_profile", Statement::Write) => {
            Violation::MissingReference("user_profile_id")
        }
        _ => return None,
    };
    Some(violation)
}

fn classify(err: sqlx::Error, statement: Statement) -> MfcError {
    if let sqlx::Error::Database(db) = &err {
        let relevant = matches!(
            db.kind(),
            ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation
        );
        if let Some(violation) = db
            .constraint()
            .filter(|_| relevant)
            .and_then(|c| constraint_violation(c, statement))
        {
            return violation.into();
        }
    }
    MfcError::Database(Report::new(err))
}

pub fn read_error(err: sqlx::Error) -> MfcError {
    MfcError::Database(Report::new(err))
}

pub fn write_error(err: sqlx::Error) -> MfcError {
    classify(err, Statement::Write)
}

pub fn delete_error(err: sqlx::Error) -> MfcError {
    classify(err, Statement::Delete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("uq_branches_email", Statement::Write, Some(Violation::DuplicateBranchEmail))]
    #[case("fk_employees_office", Statement::Delete, Some(Violation::BranchHasEmployees))]
    #[case("fk_employees_office", Statement::Write, Some(Violation::MissingReference("office_id")))]
    #[case("fk_appointments_service", Statement::Delete, Some(Violation::ServiceHasAppointments))]
    #[case("fk_branch_services_branch", Statement::Write, Some(Violation::MissingReference("branch_id")))]
    #[case("branches_pkey", Statement::Write, None)]
    fn test_constraint_mapping(
        #[case] constraint: &str,
        #[case] statement: Statement,
        #[case] expected: Option<Violation>,
    ) {
        assert_eq!(constraint_violation(constraint, statement), expected);
    }

    #[test]
    fn test_non_database_errors_stay_opaque() {
        let err = write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, MfcError::Database(_)));
    }
}
