//! Read queries against the session table.

use crate::client::ClickHouseClient;
use chrono::{DateTime, Utc};
use clickhouse::Row;
use dashboard_core::schema::RawSessionRow;
use dashboard_core::{Error, Result, SessionRecord};
use serde::Deserialize;

const SESSION_COLUMNS: &str = "session_id, toUnixTimestamp64Milli(started_at) AS started_at_ms, \
    is_bot, utm_source, device_type, city, country, time_on_site_sec, scroll_depth_pct, \
    clicks_total, clicked_buy, initiated_checkout, purchased, hero_variant, \
    social_proof_variant, scroll_hook_variant, hero_test_id, price_shown";

/// Session row as read from ClickHouse.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct SessionRow {
    pub session_id: String,
    pub started_at_ms: i64,
    pub is_bot: Option<bool>,
    pub utm_source: Option<String>,
    pub device_type: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub time_on_site_sec: Option<f64>,
    pub scroll_depth_pct: Option<f64>,
    pub clicks_total: Option<u32>,
    pub clicked_buy: Option<u32>,
    pub initiated_checkout: Option<u32>,
    pub purchased: Option<u32>,
    pub hero_variant: Option<String>,
    pub social_proof_variant: Option<String>,
    pub scroll_hook_variant: Option<String>,
    pub hero_test_id: Option<String>,
    pub price_shown: Option<f64>,
}

impl SessionRow {
    /// Converts through the shared schema contract so both store paths
    /// apply the same defaults and range checks.
    pub fn into_record(self) -> Result<SessionRecord> {
        let started_at = DateTime::<Utc>::from_timestamp_millis(self.started_at_ms)
            .ok_or_else(|| Error::validation(format!("bad started_at: {}", self.started_at_ms)))?;

        RawSessionRow {
            session_id: Some(self.session_id),
            started_at: Some(started_at),
            is_bot: self.is_bot,
            utm_source: self.utm_source,
            device_type: self.device_type,
            city: self.city,
            country: self.country,
            time_on_site_sec: self.time_on_site_sec,
            scroll_depth_pct: self.scroll_depth_pct,
            clicks_total: self.clicks_total.map(u64::from),
            clicked_buy: self.clicked_buy.map(u64::from),
            initiated_checkout: self.initiated_checkout.map(u64::from),
            purchased: self.purchased.map(u64::from),
            hero_variant: self.hero_variant,
            social_proof_variant: self.social_proof_variant,
            scroll_hook_variant: self.scroll_hook_variant,
            hero_test_id: self.hero_test_id,
            price_shown: self.price_shown,
        }
        .into_record()
    }
}

/// Fetch every session, newest first.
pub async fn fetch_all_sessions(client: &ClickHouseClient) -> Result<Vec<SessionRow>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY started_at DESC",
        SESSION_COLUMNS,
        client.config().qualified_table()
    );

    client
        .inner()
        .query(&sql)
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("Query error: {}", e)))
}

/// Fetch sessions started at or after `since`, newest first.
pub async fn fetch_sessions_since(
    client: &ClickHouseClient,
    since: DateTime<Utc>,
) -> Result<Vec<SessionRow>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE started_at >= fromUnixTimestamp64Milli(?) ORDER BY started_at DESC",
        SESSION_COLUMNS,
        client.config().qualified_table()
    );

    client
        .inner()
        .query(&sql)
        .bind(since.timestamp_millis())
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("Query error: {}", e)))
}
