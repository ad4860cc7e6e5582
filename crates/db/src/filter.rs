//! Renders core predicates and sort orders into SQL.
//!
//! Column references use the aliases the repositories select with: `b` branches,
//! `s` services, `bs` branch_services, `p` user_profiles, `e` employees and
//! `a` appointments. Substring matches are case-insensitive and use `strpos`, so
//! user input never needs LIKE escaping.

use mfc_core::filter::{
    AppointmentClause, BranchClause, BranchServiceClause, BranchSort, BranchSortField,
    EmployeeClause, Predicate, ProfileClause, ServiceClause, ServiceSort, ServiceSortField,
};
use sqlx::{Postgres, QueryBuilder};

pub trait SqlClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>);
}

fn push_contains(query: &mut QueryBuilder<'_, Postgres>, column: &str, needle: &str) {
    query.push(format!("strpos(lower({column}), lower("));
    query.push_bind(needle.to_string());
    query.push(")) > 0");
}

fn push_eq<T>(query: &mut QueryBuilder<'_, Postgres>, column: &str, value: T)
where
    T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
{
    query.push(format!("{column} = "));
    query.push_bind(value);
}

pub fn push_predicate<C: SqlClause>(query: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate<C>) {
    match predicate {
        Predicate::Empty => {
            query.push("TRUE");
        }
        Predicate::Clause(clause) => clause.push_sql(query),
        Predicate::And(a, b) => {
            query.push("(");
            push_predicate(query, a);
            query.push(" AND ");
            push_predicate(query, b);
            query.push(")");
        }
        Predicate::Or(a, b) => {
            query.push("(");
            push_predicate(query, a);
            query.push(" OR ");
            push_predicate(query, b);
            query.push(")");
        }
        Predicate::Not(inner) => {
            query.push("NOT (");
            push_predicate(query, inner);
            query.push(")");
        }
    }
}

/// Appends ` WHERE ...` unless the predicate is empty.
pub fn push_where<C: SqlClause>(query: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate<C>) {
    if !predicate.is_empty() {
        query.push(" WHERE ");
        push_predicate(query, predicate);
    }
}

impl SqlClause for BranchClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            BranchClause::NameContains(s) => push_contains(query, "b.name", s),
            BranchClause::AddressContains(s) => push_contains(query, "b.address", s),
            BranchClause::EmailContains(s) => push_contains(query, "b.email", s),
            BranchClause::PhoneContains(s) => push_contains(query, "b.phone", s),
            BranchClause::Active(active) => push_eq(query, "b.is_active", *active),
            BranchClause::CreatedSince(since) => {
                query.push("b.created_at >= ");
                query.push_bind(*since);
            }
        }
    }
}

impl SqlClause for ServiceClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ServiceClause::NameContains(s) => push_contains(query, "s.name", s),
            ServiceClause::Category(category) => push_eq(query, "s.category", category.code()),
            ServiceClause::DurationAtMost(days) => {
                query.push("s.duration_days <= ");
                query.push_bind(*days);
            }
        }
    }
}

impl SqlClause for BranchServiceClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            BranchServiceClause::Branch(id) => push_eq(query, "bs.branch_id", *id),
            BranchServiceClause::Service(id) => push_eq(query, "bs.service_id", *id),
            BranchServiceClause::Available(available) => {
                push_eq(query, "bs.is_available", *available)
            }
        }
    }
}

impl SqlClause for ProfileClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ProfileClause::FullNameContains(s) => push_contains(query, "p.full_name", s),
            ProfileClause::EmailContains(s) => push_contains(query, "p.email", s),
            ProfileClause::PhoneContains(s) => push_contains(query, "p.phone", s),
            ProfileClause::UsernameContains(s) => push_contains(query, "p.username", s),
            ProfileClause::Role(role) => push_eq(query, "p.role", role.code()),
        }
    }
}

impl SqlClause for EmployeeClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            EmployeeClause::Office(id) => push_eq(query, "e.office_id", *id),
            EmployeeClause::Position(position) => push_eq(query, "e.position", position.code()),
            EmployeeClause::Profile(id) => push_eq(query, "e.user_profile_id", *id),
        }
    }
}

impl SqlClause for AppointmentClause {
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            AppointmentClause::Status(status) => push_eq(query, "a.status", status.code()),
            AppointmentClause::Branch(id) => push_eq(query, "a.branch_id", *id),
            AppointmentClause::Service(id) => push_eq(query, "a.service_id", *id),
            AppointmentClause::Profile(id) => push_eq(query, "a.user_profile_id", *id),
            AppointmentClause::Date(date) => push_eq(query, "a.visit_date", *date),
        }
    }
}

fn direction(descending: bool) -> &'static str {
    if descending { "DESC" } else { "ASC" }
}

fn order_with_name(column: &str, name: &str, descending: bool) -> String {
    if column == name {
        format!("{column} {}", direction(descending))
    } else {
        format!("{column} {}, {name} ASC", direction(descending))
    }
}

/// ORDER BY body for branches; ties fall back to the name.
pub fn branch_order(sort: BranchSort) -> String {
    let column = match sort.field {
        BranchSortField::Name => "b.name",
        BranchSortField::CreatedAt => "b.created_at",
        BranchSortField::UpdatedAt => "b.updated_at",
    };
    order_with_name(column, "b.name", sort.descending)
}

/// ORDER BY body for services; the category sorts by its stored code.
pub fn service_order(sort: ServiceSort) -> String {
    let column = match sort.field {
        ServiceSortField::Name => "s.name",
        ServiceSortField::Category => "s.category",
        ServiceSortField::DurationDays => "s.duration_days",
        ServiceSortField::CreatedAt => "s.created_at",
    };
    order_with_name(column, "s.name", sort.descending)
}
