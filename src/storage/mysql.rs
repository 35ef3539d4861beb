//! MySQL storage backend using sqlx.
//!
//! Provides [`MysqlOrderStore`], an [`OrderStore`] backed by a
//! `sqlx::MySqlPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mysql` feature flag:
//! ```toml
//! [dependencies]
//! order-desk = { version = "0.1", features = ["mysql"] }
//! ```
//!
//! # Query building
//!
//! Every statement is assembled with `sqlx::QueryBuilder` from a
//! [`Predicate`] tree. Filter values only ever reach the server through
//! `push_bind`; the only text pushed verbatim comes from closed enums
//! ([`Column`](crate::core::Column), [`SortField`](crate::core::SortField),
//! [`SortDirection`](crate::core::SortDirection)).
//!
//! Decimal columns are read through `CAST(.. AS DOUBLE)` so they decode into
//! `f64` without pulling in a decimal crate.

use crate::config::DatabaseConfig;
use crate::core::error::DeskResult;
use crate::core::filter::{
    BadReviewFilter, BaseFilter, ExceededPriceFilter, Page, UnpaidFilter, WarningStatusFilter,
};
use crate::core::order::{OrderOption, RawOrder, StatusTimeKey};
use crate::core::predicate::{self, Predicate, StatusScope};
use crate::core::store::OrderStore;
use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Open a connection pool sized from the database configuration
pub async fn connect(config: &DatabaseConfig) -> DeskResult<MySqlPool> {
    let dsn = config.dsn()?;

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
        .max_lifetime(Some(Duration::from_secs(config.max_lifetime_secs)))
        .connect(&dsn)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "connected to MySQL"
    );
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the subset of the dispatch schema this crate reads (idempotent).
///
/// Production databases already carry these tables; this exists for
/// integration tests and local development.
pub async fn ensure_schema(pool: &MySqlPool) -> DeskResult<()> {
    const STATEMENTS: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS tbl_order (
            order_id BIGINT NOT NULL PRIMARY KEY,
            tenant_id BIGINT NOT NULL,
            worker_id BIGINT NULL,
            car_id BIGINT NULL,
            city_id BIGINT NULL,
            tariff_id BIGINT NOT NULL,
            user_create BIGINT NULL,
            status_id BIGINT NOT NULL,
            user_modifed BIGINT NULL,
            company_id BIGINT NULL,
            parking_id BIGINT NULL,
            address TEXT NULL,
            comment TEXT NULL,
            predv_price DECIMAL(12,2) NULL,
            predv_price_no_discount DECIMAL(12,2) NULL,
            device VARCHAR(32) NULL,
            order_number BIGINT NOT NULL,
            payment VARCHAR(32) NULL,
            show_phone BIGINT NULL,
            create_time BIGINT NULL,
            status_time BIGINT NOT NULL,
            time_to_client BIGINT NULL,
            app_id BIGINT NULL,
            order_time BIGINT NULL,
            predv_distance DECIMAL(12,3) NULL,
            predv_time BIGINT NULL,
            call_warning_id BIGINT NULL,
            phone VARCHAR(32) NULL,
            client_id BIGINT NOT NULL,
            bonus_payment BIGINT NULL,
            currency_id BIGINT NOT NULL,
            time_offset BIGINT NULL,
            is_fix BIGINT NOT NULL DEFAULT 0,
            update_time BIGINT NULL,
            position_id BIGINT NOT NULL,
            promo_code_id BIGINT NULL,
            mark BIGINT NULL,
            client_passenger_phone VARCHAR(32) NULL,
            active BIGINT NULL DEFAULT 1,
            is_pre_order BIGINT NULL,
            finish_time BIGINT NULL,
            comment_for_dispatcher TEXT NULL,
            realtime_price DECIMAL(12,2) NULL,
            order_code VARCHAR(64) NULL,
            client_offered_price DECIMAL(12,2) NULL,
            initial_price DECIMAL(12,2) NULL,
            time_to_order BIGINT NULL,
            INDEX idx_tenant_status (tenant_id, status_id),
            INDEX idx_status_time (status_time)
        )",
        "CREATE TABLE IF NOT EXISTS tbl_order_status (
            status_id BIGINT NOT NULL PRIMARY KEY,
            name VARCHAR(255) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_client (
            client_id BIGINT NOT NULL PRIMARY KEY,
            phone VARCHAR(32) NULL,
            name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            second_name VARCHAR(255) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_client_review (
            review_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            order_id BIGINT NOT NULL,
            rating BIGINT NOT NULL,
            INDEX idx_order (order_id)
        )",
        "CREATE TABLE IF NOT EXISTS tbl_worker (
            worker_id BIGINT NOT NULL PRIMARY KEY,
            callsign BIGINT NULL,
            name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            second_name VARCHAR(255) NULL,
            phone VARCHAR(32) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_car (
            car_id BIGINT NOT NULL PRIMARY KEY,
            name VARCHAR(255) NULL,
            color BIGINT NULL,
            gos_number VARCHAR(32) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_taxi_tariff (
            tariff_id BIGINT NOT NULL PRIMARY KEY,
            tariff_type VARCHAR(32) NULL,
            name VARCHAR(255) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_order_detail_cost (
            order_id BIGINT NOT NULL PRIMARY KEY,
            summary_cost VARCHAR(32) NULL,
            summary_cost_no_discount VARCHAR(32) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_user (
            user_id BIGINT NOT NULL PRIMARY KEY,
            name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            second_name VARCHAR(255) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_currency (
            currency_id BIGINT NOT NULL PRIMARY KEY,
            name VARCHAR(255) NULL,
            code VARCHAR(8) NULL,
            symbol VARCHAR(8) NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_car_option (
            option_id BIGINT NOT NULL PRIMARY KEY,
            name VARCHAR(255) NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS tbl_order_has_option (
            order_id BIGINT NOT NULL,
            option_id BIGINT NOT NULL,
            price DECIMAL(12,2) NULL,
            PRIMARY KEY (order_id, option_id)
        )",
        "CREATE TABLE IF NOT EXISTS tbl_order_change_data (
            change_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            order_id BIGINT NOT NULL,
            change_field VARCHAR(64) NOT NULL,
            change_val VARCHAR(255) NULL,
            change_time BIGINT NOT NULL,
            INDEX idx_order_field (order_id, change_field)
        )",
    ];

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Predicate rendering
// ---------------------------------------------------------------------------

/// Render a predicate into the builder, binding every value
pub fn push_predicate(qb: &mut QueryBuilder<'_, MySql>, predicate: &Predicate) {
    match predicate {
        Predicate::True => {
            qb.push("1=1");
        }
        Predicate::Eq(column, value) => {
            qb.push(column.sql()).push(" = ").push_bind(*value);
        }
        Predicate::In(_, values) if values.is_empty() => {
            qb.push("1=0");
        }
        Predicate::In(column, values) => {
            qb.push(column.sql()).push(" IN (");
            push_id_list(qb, values);
            qb.push(")");
        }
        Predicate::NotIn(_, values) if values.is_empty() => {
            qb.push("1=1");
        }
        Predicate::NotIn(column, values) => {
            qb.push(column.sql()).push(" NOT IN (");
            push_id_list(qb, values);
            qb.push(")");
        }
        Predicate::Between(column, lo, hi) => {
            qb.push(column.sql())
                .push(" BETWEEN ")
                .push_bind(*lo)
                .push(" AND ")
                .push_bind(*hi);
        }
        Predicate::GreaterThan(column, threshold) => {
            qb.push(column.sql()).push(" > ").push_bind(*threshold);
        }
        Predicate::ReviewRatingBetween(lo, hi) => {
            qb.push(
                "EXISTS (SELECT 1 FROM tbl_client_review cr \
                 WHERE cr.order_id = o.order_id AND cr.rating BETWEEN ",
            )
            .push_bind(*lo)
            .push(" AND ")
            .push_bind(*hi)
            .push(")");
        }
        Predicate::All(parts) => push_joined(qb, parts, " AND ", "1=1"),
        Predicate::Any(parts) => push_joined(qb, parts, " OR ", "1=0"),
    }
}

fn push_joined(qb: &mut QueryBuilder<'_, MySql>, parts: &[Predicate], glue: &str, empty: &str) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(glue);
        }
        push_predicate(qb, part);
    }
    qb.push(")");
}

fn push_id_list(qb: &mut QueryBuilder<'_, MySql>, ids: &[i64]) {
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
}

// ---------------------------------------------------------------------------
// MysqlOrderStore
// ---------------------------------------------------------------------------

const ORDER_SELECT: &str = "SELECT \
    o.order_id, o.tenant_id, o.worker_id, o.car_id, o.city_id, o.tariff_id, \
    o.user_create, o.status_id, o.user_modifed AS user_modified, o.company_id, \
    o.parking_id, o.address, o.comment, \
    CAST(o.predv_price AS DOUBLE) AS predv_price, \
    CAST(o.predv_price_no_discount AS DOUBLE) AS predv_price_no_discount, \
    o.device, o.order_number, o.payment, o.show_phone, o.create_time, o.status_time, \
    o.time_to_client, o.app_id, o.order_time, \
    CAST(o.predv_distance AS DOUBLE) AS predv_distance, \
    o.predv_time, o.call_warning_id, o.phone, o.client_id, o.bonus_payment, \
    o.currency_id, o.time_offset, o.is_fix, o.update_time, o.position_id, \
    o.promo_code_id, o.mark, o.client_passenger_phone, o.active, o.is_pre_order, \
    o.finish_time, o.comment_for_dispatcher, \
    CAST(o.realtime_price AS DOUBLE) AS realtime_price, \
    o.order_code, \
    CAST(o.client_offered_price AS DOUBLE) AS client_offered_price, \
    CAST(o.initial_price AS DOUBLE) AS initial_price, \
    o.time_to_order, \
    CAST(d.summary_cost AS CHAR) AS summary_cost, \
    CAST(d.summary_cost_no_discount AS CHAR) AS summary_cost_no_discount, \
    s.name AS status_name, \
    w.callsign AS worker_callsign, w.name AS worker_name, w.last_name AS worker_last_name, \
    w.second_name AS worker_second_name, w.phone AS worker_phone, \
    cl.phone AS client_phone, cl.name AS client_name, cl.last_name AS client_last_name, \
    cl.second_name AS client_second_name, \
    car.name AS car_name, car.color AS car_color, car.gos_number AS car_gos_number, \
    t.tariff_type, t.name AS tariff_name, \
    u.name AS user_name, u.last_name AS user_last_name, u.second_name AS user_second_name, \
    curr.name AS currency_name, curr.code AS currency_code, curr.symbol AS currency_symbol \
    FROM tbl_order o \
    LEFT JOIN tbl_client cl ON o.client_id = cl.client_id \
    LEFT JOIN tbl_order_status s ON o.status_id = s.status_id \
    LEFT JOIN tbl_worker w ON o.worker_id = w.worker_id \
    LEFT JOIN tbl_car car ON o.car_id = car.car_id \
    LEFT JOIN tbl_taxi_tariff t ON o.tariff_id = t.tariff_id \
    LEFT JOIN tbl_order_detail_cost d ON o.order_id = d.order_id \
    LEFT JOIN tbl_user u ON o.user_create = u.user_id \
    LEFT JOIN tbl_currency curr ON o.currency_id = curr.currency_id \
    WHERE ";

/// Order storage backed by MySQL.
///
/// # Example
///
/// ```rust,ignore
/// use order_desk::storage::mysql::{connect, MysqlOrderStore};
///
/// let pool = connect(&config.database).await?;
/// let store = MysqlOrderStore::new(pool);
/// let ids = store.fetch_unpaid(&filter).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MysqlOrderStore {
    pool: MySqlPool,
}

impl MysqlOrderStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn select_ids(&self, predicate: &Predicate) -> DeskResult<Vec<i64>> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT o.order_id FROM tbl_order o WHERE ");
        push_predicate(&mut qb, predicate);

        let ids = qb
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl OrderStore for MysqlOrderStore {
    async fn fetch_unpaid(&self, filter: &UnpaidFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.select_ids(&predicate::unpaid_predicate(filter)).await
    }

    async fn fetch_bad_review(&self, filter: &BadReviewFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.select_ids(&predicate::bad_review_predicate(filter)).await
    }

    async fn fetch_exceeded_price(&self, filter: &ExceededPriceFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.select_ids(&predicate::exceeded_price_predicate(filter))
            .await
    }

    async fn fetch_warning_status(&self, filter: &WarningStatusFilter) -> DeskResult<Vec<i64>> {
        filter.base.validate()?;
        self.select_ids(&predicate::warning_status_predicate(filter))
            .await
    }

    async fn count_orders(&self, filter: &BaseFilter, warning_ids: &[i64]) -> DeskResult<u64> {
        filter.validate()?;
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM tbl_order o WHERE ");
        push_predicate(&mut qb, &predicate::listing_predicate(filter, warning_ids));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_orders(
        &self,
        filter: &BaseFilter,
        warning_ids: &[i64],
        page: Page,
    ) -> DeskResult<Vec<RawOrder>> {
        filter.validate()?;
        let mut qb = QueryBuilder::<MySql>::new(ORDER_SELECT);
        push_predicate(&mut qb, &predicate::listing_predicate(filter, warning_ids));

        // Column and direction come from closed enums
        qb.push(" ORDER BY ")
            .push(filter.sort_field.column())
            .push(" ")
            .push(filter.sort_direction.as_sql())
            .push(", o.order_id ASC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let orders = qb
            .build_query_as::<RawOrder>()
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn fetch_ids_by_status_group(&self, filter: &BaseFilter) -> DeskResult<Vec<i64>> {
        filter.validate()?;
        self.select_ids(&predicate::base_predicate(filter, StatusScope::Include))
            .await
    }

    async fn fetch_options(&self, order_ids: &[i64]) -> DeskResult<HashMap<i64, Vec<OrderOption>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT oho.order_id, oho.option_id, COALESCE(co.name, '') AS name, \
             CAST(oho.price AS DOUBLE) AS price \
             FROM tbl_order_has_option oho \
             LEFT JOIN tbl_car_option co ON co.option_id = oho.option_id \
             WHERE oho.order_id IN (",
        );
        push_id_list(&mut qb, order_ids);
        qb.push(") ORDER BY oho.order_id, oho.option_id");

        let rows = qb
            .build_query_as::<OrderOption>()
            .fetch_all(&self.pool)
            .await?;

        let mut options: HashMap<i64, Vec<OrderOption>> = HashMap::new();
        for option in rows {
            options.entry(option.order_id).or_default().push(option);
        }
        Ok(options)
    }

    async fn fetch_status_times(
        &self,
        keys: &[StatusTimeKey],
    ) -> DeskResult<HashMap<StatusTimeKey, i64>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let order_ids: BTreeSet<i64> = keys.iter().map(|k| k.order_id).collect();
        let wanted: HashSet<StatusTimeKey> = keys.iter().copied().collect();

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT ch.order_id, CAST(ch.change_val AS SIGNED) AS status_id, \
             MAX(ch.change_time) AS changed_at \
             FROM tbl_order_change_data ch \
             WHERE ch.change_field = 'status_id' AND ch.change_val IS NOT NULL \
             AND ch.order_id IN (",
        );
        push_id_list(&mut qb, &order_ids.into_iter().collect::<Vec<_>>());
        qb.push(") GROUP BY ch.order_id, ch.change_val");

        let rows = qb
            .build_query_as::<(i64, i64, i64)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(order_id, status_id, at)| (StatusTimeKey::new(order_id, status_id), at))
            .filter(|(key, _)| wanted.contains(key))
            .collect())
    }
}
