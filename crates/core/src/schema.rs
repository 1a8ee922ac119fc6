//! Schema contract for ingesting session rows.
//!
//! Rows arrive from the store as loosely typed objects (PostgREST-style JSON
//! or ClickHouse rows). They are converted to [`SessionRecord`] exactly once
//! here: nulls take their field default, booleans count as 0/1 counters, and
//! each record is range-checked. Column presence is tracked for the whole
//! input so that a column missing everywhere can be told apart from a
//! per-row null.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use validator::Validate;

use crate::error::{Error, Result};
use crate::session::SessionRecord;

/// Optional columns of the `session_sessions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    IsBot,
    UtmSource,
    DeviceType,
    City,
    Country,
    TimeOnSiteSec,
    ScrollDepthPct,
    ClicksTotal,
    ClickedBuy,
    InitiatedCheckout,
    Purchased,
    HeroVariant,
    SocialProofVariant,
    ScrollHookVariant,
    HeroTestId,
    PriceShown,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Self::IsBot,
        Self::UtmSource,
        Self::DeviceType,
        Self::City,
        Self::Country,
        Self::TimeOnSiteSec,
        Self::ScrollDepthPct,
        Self::ClicksTotal,
        Self::ClickedBuy,
        Self::InitiatedCheckout,
        Self::Purchased,
        Self::HeroVariant,
        Self::SocialProofVariant,
        Self::ScrollHookVariant,
        Self::HeroTestId,
        Self::PriceShown,
    ];

    /// Column name in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsBot => "is_bot",
            Self::UtmSource => "utm_source",
            Self::DeviceType => "device_type",
            Self::City => "city",
            Self::Country => "country",
            Self::TimeOnSiteSec => "time_on_site_sec",
            Self::ScrollDepthPct => "scroll_depth_pct",
            Self::ClicksTotal => "clicks_total",
            Self::ClickedBuy => "clicked_buy",
            Self::InitiatedCheckout => "initiated_checkout",
            Self::Purchased => "purchased",
            Self::HeroVariant => "hero_variant",
            Self::SocialProofVariant => "social_proof_variant",
            Self::ScrollHookVariant => "scroll_hook_variant",
            Self::HeroTestId => "hero_test_id",
            Self::PriceShown => "price_shown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// Set of columns seen anywhere in an input.
pub type ColumnSet = BTreeSet<Column>;

/// An ingested snapshot: typed records plus the columns that were present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    records: Vec<SessionRecord>,
    columns: ColumnSet,
}

impl Dataset {
    pub fn new(records: Vec<SessionRecord>, columns: ColumnSet) -> Self {
        Self { records, columns }
    }

    /// Dataset from a typed source where every column always exists.
    pub fn with_all_columns(records: Vec<SessionRecord>) -> Self {
        Self {
            records,
            columns: Column::ALL.into_iter().collect(),
        }
    }

    /// Ingests raw JSON row objects.
    ///
    /// Rows that fail the contract are skipped and returned as errors; the
    /// rest of the snapshot is still usable.
    pub fn from_json_rows(rows: &[serde_json::Value]) -> (Self, Vec<Error>) {
        let mut records = Vec::with_capacity(rows.len());
        let mut columns = ColumnSet::new();
        let mut errors = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            if let Some(obj) = row.as_object() {
                columns.extend(obj.keys().filter_map(|k| Column::from_name(k)));
            }

            match RawSessionRow::deserialize(row)
                .map_err(Error::from)
                .and_then(RawSessionRow::into_record)
            {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(row = i, error = %e, "Skipping session row");
                    errors.push(Error::validation(format!("row[{}]: {}", i, e)));
                }
            }
        }

        (Self { records, columns }, errors)
    }

    /// Parses a JSON array of rows.
    pub fn from_json_slice(bytes: &[u8]) -> Result<(Self, Vec<Error>)> {
        let rows: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
        Ok(Self::from_json_rows(&rows))
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fails with `MissingField` when the column is absent from the input.
    pub fn require_column(&self, column: Column) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(Error::missing_field(column.as_str()))
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest `started_at` in the snapshot.
    pub fn earliest_start(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.started_at).min()
    }

    /// Same columns, different records (used after filtering).
    pub fn with_records(&self, records: Vec<SessionRecord>) -> Self {
        Self {
            records,
            columns: self.columns.clone(),
        }
    }

    /// Sorts records newest first, the order the store returns them in.
    pub fn sort_newest_first(&mut self) {
        self.records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    }
}

/// Loosely typed session row as exported by the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSessionRow {
    #[serde(alias = "id")]
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub is_bot: Option<bool>,
    pub utm_source: Option<String>,
    pub device_type: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub time_on_site_sec: Option<f64>,
    pub scroll_depth_pct: Option<f64>,
    #[serde(deserialize_with = "deserialize_counter")]
    pub clicks_total: Option<u64>,
    #[serde(deserialize_with = "deserialize_counter")]
    pub clicked_buy: Option<u64>,
    #[serde(deserialize_with = "deserialize_counter")]
    pub initiated_checkout: Option<u64>,
    #[serde(deserialize_with = "deserialize_counter")]
    pub purchased: Option<u64>,
    pub hero_variant: Option<String>,
    pub social_proof_variant: Option<String>,
    pub scroll_hook_variant: Option<String>,
    pub hero_test_id: Option<String>,
    pub price_shown: Option<f64>,
}

impl RawSessionRow {
    /// Applies field defaults and validates ranges.
    pub fn into_record(self) -> Result<SessionRecord> {
        let session_id = self
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("session_id is required"))?;
        let started_at = self
            .started_at
            .ok_or_else(|| Error::validation("started_at is required"))?;

        let record = SessionRecord {
            session_id,
            started_at,
            is_bot: self.is_bot.unwrap_or(false),
            utm_source: self.utm_source,
            device_type: self.device_type,
            city: self.city,
            country: self.country,
            time_on_site_sec: self.time_on_site_sec.unwrap_or(0.0),
            scroll_depth_pct: self.scroll_depth_pct.unwrap_or(0.0),
            clicks_total: self.clicks_total.unwrap_or(0),
            clicked_buy: self.clicked_buy.unwrap_or(0),
            initiated_checkout: self.initiated_checkout.unwrap_or(0),
            purchased: self.purchased.unwrap_or(0),
            hero_variant: self.hero_variant,
            social_proof_variant: self.social_proof_variant,
            scroll_hook_variant: self.scroll_hook_variant,
            hero_test_id: self.hero_test_id,
            price_shown: self.price_shown,
        };

        record
            .validate()
            .map_err(|e| Error::validation(format!("{}", e)))?;

        Ok(record)
    }
}

/// Counters are stored as integers in some tables and booleans in others.
fn deserialize_counter<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CounterValue {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    let value = Option::<CounterValue>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(CounterValue::Bool(b)) => Ok(Some(u64::from(b))),
        Some(CounterValue::Int(n)) if n >= 0 => Ok(Some(n as u64)),
        Some(CounterValue::Float(f)) if f >= 0.0 && f.is_finite() => Ok(Some(f as u64)),
        Some(_) => Err(serde::de::Error::custom("counter must be non-negative")),
    }
}
