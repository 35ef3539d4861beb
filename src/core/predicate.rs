//! Dialect-neutral order predicates
//!
//! Every read the pipeline issues is described as a [`Predicate`] tree built
//! here, once, from the typed filters. Backends only interpret the tree: the
//! in-memory store evaluates it against rows with [`Predicate::matches`], the
//! MySQL store renders it into a query with bound parameters. Filter values
//! never become query text.
//!
//! Null handling follows SQL: a comparison against a missing column value is
//! false, so an order without a city never matches a city restriction.

use crate::core::filter::{
    BadReviewFilter, BaseFilter, ExceededPriceFilter, UnpaidFilter, WarningStatusFilter,
};

/// Columns of the order table a predicate may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    OrderId,
    TenantId,
    Active,
    StatusId,
    StatusTime,
    CityId,
    TariffId,
    PositionId,
    RealtimePrice,
}

impl Column {
    pub fn sql(&self) -> &'static str {
        match self {
            Column::OrderId => "o.order_id",
            Column::TenantId => "o.tenant_id",
            Column::Active => "o.active",
            Column::StatusId => "o.status_id",
            Column::StatusTime => "o.status_time",
            Column::CityId => "o.city_id",
            Column::TariffId => "o.tariff_id",
            Column::PositionId => "o.position_id",
            Column::RealtimePrice => "o.realtime_price",
        }
    }
}

/// A boolean condition over one order
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Always true
    True,
    Eq(Column, i64),
    /// Membership; an empty list matches nothing
    In(Column, Vec<i64>),
    /// Exclusion; an empty list excludes nothing
    NotIn(Column, Vec<i64>),
    /// Inclusive range
    Between(Column, i64, i64),
    GreaterThan(Column, f64),
    /// A linked client review exists with a rating in the inclusive range
    ReviewRatingBetween(i64, i64),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

/// Read access to the values a predicate can test
pub trait PredicateTarget {
    fn int_value(&self, column: Column) -> Option<i64>;

    fn float_value(&self, column: Column) -> Option<f64>;

    fn review_ratings(&self) -> &[i64];
}

impl Predicate {
    /// Evaluate against a single row
    pub fn matches<T: PredicateTarget + ?Sized>(&self, row: &T) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Eq(col, value) => row.int_value(*col) == Some(*value),
            Predicate::In(col, values) => row
                .int_value(*col)
                .is_some_and(|v| values.contains(&v)),
            Predicate::NotIn(col, values) => {
                values.is_empty() || row.int_value(*col).is_some_and(|v| !values.contains(&v))
            }
            Predicate::Between(col, lo, hi) => row
                .int_value(*col)
                .is_some_and(|v| v >= *lo && v <= *hi),
            Predicate::GreaterThan(col, threshold) => row
                .float_value(*col)
                .or_else(|| row.int_value(*col).map(|v| v as f64))
                .is_some_and(|v| v > *threshold),
            Predicate::ReviewRatingBetween(lo, hi) => row
                .review_ratings()
                .iter()
                .any(|rating| rating >= lo && rating <= hi),
            Predicate::All(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(row)),
        }
    }
}

/// Whether the filter's own status list takes part in the predicate
///
/// Attention criteria ignore it: an order needs attention whatever tab the
/// dispatcher is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    Include,
    Ignore,
}

/// Tenant scope and the active flag, present in every query
pub fn scope(filter: &BaseFilter) -> Vec<Predicate> {
    vec![
        Predicate::Eq(Column::TenantId, filter.tenant_id),
        Predicate::Eq(Column::Active, 1),
    ]
}

/// Optional restrictions of the base filter; empty lists add nothing
pub fn restrictions(filter: &BaseFilter, status: StatusScope) -> Vec<Predicate> {
    let mut parts = Vec::new();

    if let Some(range) = filter.date_range {
        parts.push(Predicate::Between(Column::StatusTime, range.from, range.to));
    }

    let lists = [
        (Column::CityId, &filter.city_ids),
        (Column::TariffId, &filter.tariff_ids),
        (Column::PositionId, &filter.position_ids),
    ];
    for (column, ids) in lists {
        if !ids.is_empty() {
            parts.push(Predicate::In(column, ids.clone()));
        }
    }

    if status == StatusScope::Include && !filter.status_ids.is_empty() {
        parts.push(Predicate::In(Column::StatusId, filter.status_ids.clone()));
    }

    parts
}

/// The shared base predicate: scope plus every restriction
pub fn base_predicate(filter: &BaseFilter, status: StatusScope) -> Predicate {
    let mut parts = scope(filter);
    parts.extend(restrictions(filter, status));
    Predicate::All(parts)
}

fn with_criterion(filter: &BaseFilter, extra: Vec<Predicate>) -> Predicate {
    let mut parts = scope(filter);
    parts.extend(restrictions(filter, StatusScope::Ignore));
    parts.extend(extra);
    Predicate::All(parts)
}

/// Completed but not paid
pub fn unpaid_predicate(filter: &UnpaidFilter) -> Predicate {
    with_criterion(
        &filter.base,
        vec![Predicate::Eq(
            Column::StatusId,
            filter.status_completed_not_paid,
        )],
    )
}

/// Reviewed with a rating in `[1, bad_rating_max]`
pub fn bad_review_predicate(filter: &BadReviewFilter) -> Predicate {
    with_criterion(
        &filter.base,
        vec![Predicate::ReviewRatingBetween(1, filter.bad_rating_max)],
    )
}

/// Realtime price above the threshold on an order that is not finished
pub fn exceeded_price_predicate(filter: &ExceededPriceFilter) -> Predicate {
    with_criterion(
        &filter.base,
        vec![
            Predicate::NotIn(Column::StatusId, filter.finished_status.clone()),
            Predicate::GreaterThan(Column::RealtimePrice, filter.min_real_price),
        ],
    )
}

/// Status on the explicit warning allow-list
pub fn warning_status_predicate(filter: &WarningStatusFilter) -> Predicate {
    with_criterion(
        &filter.base,
        vec![Predicate::In(Column::StatusId, filter.warning_status.clone())],
    )
}

/// Listing predicate, OR-extended by the warning ids when there are any
///
/// The tenant scope and active flag stay outside the disjunction so warning
/// ids can never widen a listing past its tenant.
pub fn listing_predicate(filter: &BaseFilter, warning_ids: &[i64]) -> Predicate {
    if warning_ids.is_empty() {
        return base_predicate(filter, StatusScope::Include);
    }

    let mut parts = scope(filter);
    parts.push(Predicate::Any(vec![
        Predicate::All(restrictions(filter, StatusScope::Include)),
        Predicate::In(Column::OrderId, warning_ids.to_vec()),
    ]));
    Predicate::All(parts)
}
