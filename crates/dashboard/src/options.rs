//! Dashboard view options.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use dashboard_core::{Cohort, FilterChain, Period, SessionFilter};
use serde::{Deserialize, Serialize};

/// Which traffic sources to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSelection {
    /// Only the configured primary source.
    #[default]
    Primary,
    /// Every source.
    All,
    /// An explicit set of source tags.
    Only(BTreeSet<String>),
}

impl SourceSelection {
    /// Parses a comma list; `all` selects everything, blank selects the primary source.
    /// Tags are kept as typed; matching ignores case.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::Primary;
        }
        if value.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        let sources: BTreeSet<String> = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if sources.is_empty() {
            Self::Primary
        } else {
            Self::Only(sources)
        }
    }
}

/// Everything a viewer can toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOptions {
    pub period: Period,
    /// Show period-over-period deltas
    pub compare: bool,
    pub exclude_bots: bool,
    pub sources: SourceSelection,
    pub price_point: Option<f64>,
    /// Product-version cutoff; enables the cohort split
    pub version_cutoff: Option<DateTime<Utc>>,
    /// Keep only one side of `version_cutoff`
    pub cohort: Option<Cohort>,
    pub test_round: Option<String>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            period: Period::Today,
            compare: true,
            exclude_bots: true,
            sources: SourceSelection::Primary,
            price_point: None,
            version_cutoff: None,
            cohort: None,
            test_round: None,
        }
    }
}

impl DashboardOptions {
    pub fn for_period(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Filters applied identically to the current and previous windows.
    pub fn filter_chain(&self, primary_source: &str) -> FilterChain {
        let mut chain = FilterChain::new();

        match &self.sources {
            SourceSelection::Primary => chain.push(SessionFilter::source(primary_source)),
            SourceSelection::Only(sources) => chain.push(SessionFilter::Sources {
                sources: sources.clone(),
            }),
            SourceSelection::All => {}
        }
        if self.exclude_bots {
            chain.push(SessionFilter::ExcludeBots);
        }
        if let Some(price) = self.price_point {
            chain.push(SessionFilter::PricePoint { price });
        }
        if let (Some(cutoff), Some(cohort)) = (self.version_cutoff, self.cohort) {
            chain.push(SessionFilter::Version { cutoff, cohort });
        }
        if let Some(test_id) = &self.test_round {
            chain.push(SessionFilter::TestRound {
                test_id: test_id.clone(),
            });
        }

        chain
    }
}
