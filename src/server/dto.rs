//! Request payloads and the validating JSON extractor

use crate::config::PaginationConfig;
use crate::core::error::{DeskError, DeskResult, ValidationError};
use crate::core::filter::{
    BaseFilter, DateRange, Page, SortDirection, SortField, WarningCriteria, WarningFilter,
};
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// One request shape for every order endpoint
///
/// Criterion thresholds are optional so the same payload serves the
/// per-criterion endpoints, the grouped listing and the tabs.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OrderRequest {
    #[validate(range(min = 1, message = "tenant_id must be positive"))]
    pub tenant_id: i64,

    #[serde(default, deserialize_with = "lenient_ids")]
    pub city_ids: Vec<i64>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub tariffs: Vec<i64>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub user_positions: Vec<i64>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub status: Vec<i64>,

    pub status_time_from: Option<i64>,
    pub status_time_to: Option<i64>,

    #[serde(default)]
    pub sort_field: String,
    #[serde(default)]
    pub sort_order: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub select_for_date: bool,

    #[serde(default, deserialize_with = "lenient_ids")]
    pub warning_status: Vec<i64>,
    #[serde(default)]
    pub status_completed_not_paid: i64,
    #[validate(range(min = 1, max = 5, message = "bad_rating_max must be between 1 and 5"))]
    pub bad_rating_max: Option<i64>,
    #[validate(range(min = 0.0, message = "min_real_price must not be negative"))]
    pub min_real_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub finished_status: Vec<i64>,

    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl OrderRequest {
    /// Build the pipeline filter; an unknown sort field is rejected here
    pub fn to_filter(&self) -> DeskResult<WarningFilter> {
        let sort_field: SortField = self.sort_field.parse()?;
        let base = BaseFilter {
            tenant_id: self.tenant_id,
            city_ids: self.city_ids.clone(),
            tariff_ids: self.tariffs.clone(),
            position_ids: self.user_positions.clone(),
            status_ids: self.status.clone(),
            date_range: DateRange::from_bounds(self.status_time_from, self.status_time_to),
            sort_field,
            sort_direction: SortDirection::parse_lenient(&self.sort_order),
            group: self.group.trim().to_string(),
            select_for_date: self.select_for_date,
        };
        base.validate()?;

        let criteria = WarningCriteria {
            status_completed_not_paid: self.status_completed_not_paid,
            bad_rating_max: self.bad_rating_max.unwrap_or(0),
            min_real_price: self.min_real_price.unwrap_or(0.0),
            finished_status: self.finished_status.clone(),
            warning_status: self.warning_status.clone(),
        };
        Ok(WarningFilter::new(base, criteria))
    }

    pub fn page(&self, pagination: &PaginationConfig) -> Page {
        Page::normalize(
            self.page,
            self.page_size,
            pagination.default_page_size,
            pagination.max_page_size,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Number(i64),
    Text(String),
}

/// Id lists arrive as numbers or numeric strings depending on the client;
/// `null` is an empty list
fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<LenientId>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|id| match id {
            LenientId::Number(n) => Ok(n),
            LenientId::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid id '{}'", s))),
        })
        .collect()
}

/// Axum extractor that parses a JSON body and runs its `Validate` rules
///
/// Both malformed JSON and rule violations are rejected as
/// [`DeskError::Validation`], so clients see one error shape.
///
/// ```rust,ignore
/// async fn handler(ValidatedJson(req): ValidatedJson<OrderRequest>) { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = DeskError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ValidationError::InvalidJson {
                message: e.body_text(),
            })?;

        payload.validate()?;
        Ok(ValidatedJson(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> OrderRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let req = parse(json!({
            "tenant_id": 3,
            "status": ["4", 5, " 6 "],
            "city_ids": null
        }));
        assert_eq!(req.status, vec![4, 5, 6]);
        assert!(req.city_ids.is_empty());
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let err = serde_json::from_value::<OrderRequest>(json!({
            "tenant_id": 3,
            "status": ["four"]
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_validation_rules() {
        assert!(parse(json!({"tenant_id": 1})).validate().is_ok());
        assert!(parse(json!({"tenant_id": 0})).validate().is_err());
        assert!(
            parse(json!({"tenant_id": 1, "bad_rating_max": 6}))
                .validate()
                .is_err()
        );
        assert!(
            parse(json!({"tenant_id": 1, "min_real_price": -1.0}))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_to_filter_maps_wire_names() {
        let req = parse(json!({
            "tenant_id": 8,
            "city_ids": [1],
            "tariffs": [2],
            "user_positions": [3],
            "status_time_from": 100,
            "status_time_to": 200,
            "sort_field": "o.order_time",
            "sort_order": "asc",
            "group": "warning",
            "warning_status": [5],
            "status_completed_not_paid": 38,
            "bad_rating_max": 2,
            "min_real_price": 700.0,
            "finished_status": [37]
        }));
        let filter = req.to_filter().unwrap();

        assert_eq!(filter.base.tariff_ids, vec![2]);
        assert_eq!(filter.base.position_ids, vec![3]);
        assert_eq!(filter.base.date_range, Some(DateRange { from: 100, to: 200 }));
        assert_eq!(filter.base.sort_field, SortField::OrderTime);
        assert_eq!(filter.base.sort_direction, SortDirection::Asc);
        assert!(filter.base.is_warning_group());
        assert_eq!(filter.criteria.bad_rating_max, 2);
        assert_eq!(filter.criteria.finished_status, vec![37]);
    }

    #[test]
    fn test_to_filter_rejects_unknown_sort_field() {
        let req = parse(json!({"tenant_id": 1, "sort_field": "client_phone"}));
        assert!(matches!(
            req.to_filter(),
            Err(DeskError::Validation(ValidationError::InvalidSortField { .. }))
        ));
    }

    #[test]
    fn test_page_uses_configured_defaults() {
        let pagination = PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        };
        let page = parse(json!({"tenant_id": 1, "page": -1, "page_size": 1000})).page(&pagination);
        assert_eq!(page, Page { page: 0, page_size: 100 });

        let page = parse(json!({"tenant_id": 1})).page(&pagination);
        assert_eq!(page.page_size, 20);
    }
}
