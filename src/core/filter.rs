//! Order filters shared by every read in the pipeline
//!
//! A [`BaseFilter`] carries the tenant scope and the dispatcher's list
//! selections. Each attention criterion extends it with exactly one extra
//! field; [`WarningFilter`] bundles all of them so one request can drive the
//! whole aggregation.

use crate::core::error::{DeskResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive bounds on the status-change time, in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    /// Build a range only when both bounds are present
    pub fn from_bounds(from: Option<i64>, to: Option<i64>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) => Some(Self { from, to }),
            _ => None,
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.from && ts <= self.to
    }
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Lenient parse: anything other than `asc` sorts descending
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Columns a listing may be ordered by
///
/// The set is closed so a sort request can never reach a query as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    StatusTime,
    OrderTime,
    CreateTime,
    UpdateTime,
    OrderId,
    OrderNumber,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::StatusTime => "o.status_time",
            SortField::OrderTime => "o.order_time",
            SortField::CreateTime => "o.create_time",
            SortField::UpdateTime => "o.update_time",
            SortField::OrderId => "o.order_id",
            SortField::OrderNumber => "o.order_number",
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    /// Accepts both bare (`status_time`) and table-qualified (`o.status_time`)
    /// names; empty input selects the default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix("o.").unwrap_or(trimmed);
        match bare {
            "" | "status_time" => Ok(SortField::StatusTime),
            "order_time" => Ok(SortField::OrderTime),
            "create_time" => Ok(SortField::CreateTime),
            "update_time" => Ok(SortField::UpdateTime),
            "order_id" => Ok(SortField::OrderId),
            "order_number" => Ok(SortField::OrderNumber),
            _ => Err(ValidationError::InvalidSortField {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Common scoping for every order query
///
/// Empty id lists mean "no restriction on that dimension".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseFilter {
    pub tenant_id: i64,
    #[serde(default)]
    pub city_ids: Vec<i64>,
    #[serde(default)]
    pub tariff_ids: Vec<i64>,
    #[serde(default)]
    pub position_ids: Vec<i64>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
    /// Free-form tab tag; `"warning"` switches listings to warning mode
    #[serde(default)]
    pub group: String,
    /// Passed through to storage untouched; see DESIGN.md
    #[serde(default)]
    pub select_for_date: bool,
}

impl BaseFilter {
    pub fn for_tenant(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            ..Default::default()
        }
    }

    /// Check the invariants every backend relies on
    pub fn validate(&self) -> DeskResult<()> {
        if self.tenant_id <= 0 {
            return Err(ValidationError::MissingTenant.into());
        }
        match self.date_range {
            Some(range) if range.from > range.to => Err(ValidationError::InvalidDateRange {
                from: range.from,
                to: range.to,
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Copy with the status selection replaced
    pub fn with_statuses(&self, status_ids: &[i64]) -> Self {
        Self {
            status_ids: status_ids.to_vec(),
            ..self.clone()
        }
    }

    /// Copy with `select_for_date` forced to the given value
    pub fn with_select_for_date(&self, select_for_date: bool) -> Self {
        Self {
            select_for_date,
            ..self.clone()
        }
    }

    pub fn is_warning_group(&self) -> bool {
        self.group == "warning"
    }
}

/// Base filter plus the "completed, not paid" status code
#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidFilter {
    pub base: BaseFilter,
    pub status_completed_not_paid: i64,
}

/// Base filter plus the highest rating still considered bad
#[derive(Debug, Clone, PartialEq)]
pub struct BadReviewFilter {
    pub base: BaseFilter,
    pub bad_rating_max: i64,
}

/// Base filter plus the price threshold and the statuses to leave out
#[derive(Debug, Clone, PartialEq)]
pub struct ExceededPriceFilter {
    pub base: BaseFilter,
    pub min_real_price: f64,
    pub finished_status: Vec<i64>,
}

/// Base filter plus the explicit warning status allow-list
#[derive(Debug, Clone, PartialEq)]
pub struct WarningStatusFilter {
    pub base: BaseFilter,
    pub warning_status: Vec<i64>,
}

/// Thresholds for the four attention criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningCriteria {
    #[serde(default)]
    pub status_completed_not_paid: i64,
    #[serde(default)]
    pub bad_rating_max: i64,
    #[serde(default)]
    pub min_real_price: f64,
    #[serde(default)]
    pub finished_status: Vec<i64>,
    #[serde(default)]
    pub warning_status: Vec<i64>,
}

/// A base filter together with every criterion threshold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningFilter {
    pub base: BaseFilter,
    #[serde(default)]
    pub criteria: WarningCriteria,
}

impl WarningFilter {
    pub fn new(base: BaseFilter, criteria: WarningCriteria) -> Self {
        Self { base, criteria }
    }

    pub fn unpaid(&self) -> UnpaidFilter {
        UnpaidFilter {
            base: self.base.clone(),
            status_completed_not_paid: self.criteria.status_completed_not_paid,
        }
    }

    pub fn bad_review(&self) -> BadReviewFilter {
        BadReviewFilter {
            base: self.base.clone(),
            bad_rating_max: self.criteria.bad_rating_max,
        }
    }

    pub fn exceeded_price(&self) -> ExceededPriceFilter {
        ExceededPriceFilter {
            base: self.base.clone(),
            min_real_price: self.criteria.min_real_price,
            finished_status: self.criteria.finished_status.clone(),
        }
    }

    pub fn warning_status(&self) -> WarningStatusFilter {
        WarningStatusFilter {
            base: self.base.clone(),
            warning_status: self.criteria.warning_status.clone(),
        }
    }

    /// Copy with `select_for_date` forced on the base filter
    pub fn with_select_for_date(&self, select_for_date: bool) -> Self {
        Self {
            base: self.base.with_select_for_date(select_for_date),
            criteria: self.criteria.clone(),
        }
    }
}

/// A normalised page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    /// Normalise raw wire values: negative pages become the first page,
    /// non-positive sizes fall back to `default_size`, and sizes above
    /// `max_size` are clamped.
    pub fn normalize(
        page: Option<i64>,
        page_size: Option<i64>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let page = page.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32;
        let page_size = match page_size {
            Some(size) if size > 0 => (size.min(i64::from(max_size.max(1)))) as u32,
            _ => default_size.max(1),
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}
