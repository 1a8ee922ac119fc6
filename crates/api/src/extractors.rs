//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use dashboard::{DashboardOptions, SourceSelection};
use dashboard_core::{Cohort, Period};
use serde::{Deserialize, Deserializer};

use crate::response::ApiError;

/// Raw dashboard query string.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    pub compare: Option<bool>,
    pub exclude_bots: Option<bool>,
    /// Comma list of sources, or `all`
    pub source: Option<String>,
    pub price: Option<f64>,
    /// RFC 3339; send `Z` or a percent-encoded `%2B` offset
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub version_cutoff: Option<DateTime<Utc>>,
    pub cohort: Option<Cohort>,
    pub test_round: Option<String>,
}

impl DashboardQuery {
    /// Validates the query and fills unset options with the default view.
    pub fn into_options(self) -> Result<DashboardOptions, ApiError> {
        let defaults = DashboardOptions::default();

        let period = match self.period.as_deref() {
            Some(p) => p.parse::<Period>()?,
            None => defaults.period,
        };

        if let Some(price) = self.price {
            if !(price.is_finite() && price > 0.0) {
                return Err(ApiError::bad_request(format!("price must be positive, got {}", price)));
            }
        }

        if self.cohort.is_some() && self.version_cutoff.is_none() {
            return Err(ApiError::bad_request("cohort requires version_cutoff"));
        }

        Ok(DashboardOptions {
            period,
            compare: self.compare.unwrap_or(defaults.compare),
            exclude_bots: self.exclude_bots.unwrap_or(defaults.exclude_bots),
            sources: self
                .source
                .as_deref()
                .map(SourceSelection::parse)
                .unwrap_or(defaults.sources),
            price_point: self.price,
            version_cutoff: self.version_cutoff,
            cohort: self.cohort,
            test_round: self.test_round.filter(|t| !t.trim().is_empty()),
        })
    }
}

/// Parses an RFC 3339 timestamp from a query string.
///
/// An unescaped `+` offset arrives form-decoded as a space, so a failed parse
/// is retried with the last space read back as `+`.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let parsed = DateTime::parse_from_rfc3339(value).or_else(|err| match value.rfind(' ') {
        Some(idx) => {
            let mut restored = value.to_string();
            restored.replace_range(idx..=idx, "+");
            DateTime::parse_from_rfc3339(&restored).map_err(|_| err)
        }
        None => Err(err),
    })?;
    Ok(parsed.with_timezone(&Utc))
}

/// Optional query timestamp; blank counts as unset.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| {
            parse_timestamp(&value).map_err(|e| {
                serde::de::Error::custom(format!("invalid timestamp '{}': {}", value, e))
            })
        })
        .transpose()
}

/// Dashboard options parsed from the query string.
#[derive(Debug, Clone)]
pub struct DashboardParams(pub DashboardOptions);

#[async_trait]
impl<S> FromRequestParts<S> for DashboardParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<DashboardQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        Ok(DashboardParams(query.into_options()?))
    }
}
