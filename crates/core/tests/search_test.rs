use chrono::{Duration, Utc};
use mfc_core::filter::{
    BranchClause, BranchSortField, Predicate, ServiceClause, ServiceSortField, Sort,
};
use mfc_core::models::{
    branch::Branch,
    service::{Category, Service},
};
use mfc_core::search::{
    BranchListQuery, ComplexSearchQuery, FastServicesQuery, ServiceListQuery, branch_export,
    parse_flag, service_export,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

fn branch(name: &str, address: &str, email: &str, is_active: bool) -> Branch {
    let now = Utc::now();
    Branch {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: address.to_string(),
        phone: "89161234567".to_string(),
        email: email.to_string(),
        photo: None,
        work_schedule: "Mon-Fri 9:00-18:00".to_string(),
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn service(name: &str, category: Category, duration_days: i32) -> Service {
    let now = Utc::now();
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category,
        duration_days,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_empty_predicate_is_identity() {
    let clause = Predicate::clause(BranchClause::Active(true));

    assert_eq!(Predicate::empty().or(clause.clone()), clause);
    assert_eq!(Predicate::empty().and(clause.clone()), clause);
    assert_eq!(Predicate::<BranchClause>::empty().negate(), Predicate::Empty);

    let inactive = branch("North office", "Some long address 1", "n@mfc.ru", false);
    assert!(Predicate::<BranchClause>::empty().evaluate(&inactive));
    assert!(!clause.evaluate(&inactive));
}

#[test]
fn test_complex_search() {
    let query = ComplexSearchQuery {
        query: Some("office".to_string()),
        active: Some("true".to_string()),
    };
    let predicate = query.predicate();

    let by_name = branch("Main OFFICE", "Lenina street 1", "main@mfc.ru", true);
    let by_address = branch("Central", "Office park, building 4", "central@mfc.ru", true);
    let inactive = branch("Old office", "Lenina street 2", "old@mfc.ru", false);
    let test_email = branch("Test office", "Lenina street 3", "test@mfc.ru", true);
    let unrelated = branch("Central", "Lenina street 4", "c2@mfc.ru", true);

    assert!(predicate.evaluate(&by_name));
    assert!(predicate.evaluate(&by_address));
    assert!(!predicate.evaluate(&inactive));
    assert!(!predicate.evaluate(&test_email));
    assert!(!predicate.evaluate(&unrelated));
}

#[test]
fn test_complex_search_without_parameters_still_excludes_test_emails() {
    let predicate = ComplexSearchQuery::default().predicate();

    assert!(predicate.evaluate(&branch("A", "Street 1", "a@mfc.ru", false)));
    assert!(!predicate.evaluate(&branch("B", "Street 2", "qa-TEST@mfc.ru", true)));
}

#[test]
fn test_complex_search_query_is_trimmed() {
    let blank = ComplexSearchQuery {
        query: Some("   ".to_string()),
        active: None,
    };
    assert_eq!(blank.predicate(), ComplexSearchQuery::default().predicate());

    let padded = ComplexSearchQuery {
        query: Some("  office ".to_string()),
        active: None,
    };
    assert!(padded.predicate().evaluate(&branch("Main office", "Street 1", "m@mfc.ru", true)));
}

#[rstest]
#[case(Some("abc"))]
#[case(None)]
#[case(Some(""))]
fn test_fast_services_ignores_unparseable_max_days(#[case] max_days: Option<&str>) {
    let query = FastServicesQuery {
        max_days: max_days.map(str::to_string),
    };
    assert_eq!(query.predicate(), FastServicesQuery::default().predicate());
}

#[test]
fn test_fast_services() {
    let predicate = FastServicesQuery {
        max_days: Some("10".to_string()),
    }
    .predicate();

    assert!(predicate.evaluate(&service("Birth certificate", Category::Documents, 7)));
    assert!(predicate.evaluate(&service("Medical certificate", Category::Health, 1)));
    assert!(!predicate.evaluate(&service("Birth certificate", Category::Documents, 30)));
    assert!(!predicate.evaluate(&service("Trade license", Category::Business, 5)));
    assert!(!predicate.evaluate(&service("Temporary permit", Category::Transport, 2)));
}

#[test]
fn test_service_list_query() {
    let query = ServiceListQuery {
        category: Some("DOC".to_string()),
        search: Some("pass".to_string()),
        ordering: Some("-duration_days".to_string()),
    };

    assert_eq!(
        query.predicate(),
        Predicate::clause(ServiceClause::Category(Category::Documents)).and(Predicate::clause(
            ServiceClause::NameContains("pass".to_string())
        ))
    );
    assert_eq!(
        query.sort(),
        Sort {
            field: ServiceSortField::DurationDays,
            descending: true
        }
    );
}

#[test]
fn test_unknown_values_do_not_constrain() {
    let query = ServiceListQuery {
        category: Some("NOPE".to_string()),
        search: None,
        ordering: Some("password".to_string()),
    };
    assert!(query.predicate().is_empty());
    assert_eq!(query.sort(), Sort::ascending(ServiceSortField::Name));

    let query = BranchListQuery {
        is_active: Some("maybe".to_string()),
        ordering: Some("-created_at".to_string()),
    };
    assert!(query.predicate().is_empty());
    assert_eq!(query.sort().field, BranchSortField::CreatedAt);
}

#[test]
fn test_branch_export_window() {
    let now = Utc::now();
    let predicate = branch_export(now);

    let mut recent = branch("Recent", "Street 1 building", "r@mfc.ru", true);
    recent.created_at = now - Duration::days(4);
    let mut stale = branch("Stale", "Street 2 building", "s@mfc.ru", true);
    stale.created_at = now - Duration::days(6);

    assert!(predicate.evaluate(&recent));
    assert!(!predicate.evaluate(&stale));
}

#[test]
fn test_service_export_selection() {
    let (predicate, sort) = service_export();

    assert!(predicate.evaluate(&service("Social card", Category::Social, 21)));
    assert!(!predicate.evaluate(&service("Trade license", Category::Business, 30)));
    assert_eq!(sort, Sort::ascending(ServiceSortField::Category));
}

#[rstest]
#[case(Some("true"), Some(true))]
#[case(Some("1"), Some(true))]
#[case(Some("False"), Some(false))]
#[case(Some("off"), Some(false))]
#[case(Some("abc"), None)]
#[case(None, None)]
fn test_parse_flag(#[case] raw: Option<&str>, #[case] expected: Option<bool>) {
    assert_eq!(parse_flag(raw), expected);
}
