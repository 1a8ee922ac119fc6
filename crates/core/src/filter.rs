//! Session filters.
//!
//! Every dashboard option that narrows the record set is one
//! [`SessionFilter`]; a [`FilterChain`] applies them as a conjunction. The
//! same chain is applied to the current and the previous window so the two
//! stay comparable.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Which side of a version cutoff to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// Sessions started before the cutoff.
    Before,
    /// Sessions started at or after the cutoff.
    After,
}

impl Cohort {
    /// Classifies a start time against a cutoff.
    pub fn classify(cutoff: DateTime<Utc>, at: DateTime<Utc>) -> Self {
        if at < cutoff {
            Self::Before
        } else {
            Self::After
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// A single record predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionFilter {
    /// Drop sessions flagged as bots.
    ExcludeBots,
    /// Keep sessions whose `utm_source` is one of the given tags, ignoring case.
    Sources { sources: BTreeSet<String> },
    /// Keep sessions shown exactly this price.
    PricePoint { price: f64 },
    /// Keep one side of a product-version cutoff.
    Version { cutoff: DateTime<Utc>, cohort: Cohort },
    /// Keep one test round of the hero experiment.
    TestRound { test_id: String },
}

impl SessionFilter {
    pub fn source(source: impl Into<String>) -> Self {
        Self::Sources {
            sources: BTreeSet::from([source.into()]),
        }
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        match self {
            Self::ExcludeBots => !record.is_bot,
            Self::Sources { sources } => record
                .utm_source
                .as_deref()
                .is_some_and(|s| sources.iter().any(|wanted| wanted.eq_ignore_ascii_case(s))),
            Self::PricePoint { price } => record.price_shown == Some(*price),
            Self::Version { cutoff, cohort } => {
                Cohort::classify(*cutoff, record.started_at) == *cohort
            }
            Self::TestRound { test_id } => record.hero_test_id.as_deref() == Some(test_id.as_str()),
        }
    }

    /// Short label for the header caption.
    pub fn tag(&self) -> String {
        match self {
            Self::ExcludeBots => "No Bots".to_string(),
            Self::Sources { sources } => sources
                .iter()
                .map(|s| display_source(s))
                .collect::<Vec<_>>()
                .join(" + "),
            Self::PricePoint { price } => format!("${:.2}", price),
            Self::Version { cutoff, cohort } => {
                format!("{} {}", cohort.as_str(), cutoff.format("%Y-%m-%d %H:%M"))
            }
            Self::TestRound { test_id } => format!("Round {}", test_id),
        }
    }
}

fn display_source(source: &str) -> String {
    match source {
        s if s.eq_ignore_ascii_case("tiktok") => "TikTok".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Conjunction of filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterChain {
    filters: Vec<SessionFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: SessionFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: SessionFilter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[SessionFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Records passing every filter, order preserved.
    pub fn apply<'a, I>(&self, records: I) -> Vec<SessionRecord>
    where
        I: IntoIterator<Item = &'a SessionRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Caption tags, or "All Traffic" when nothing narrows the set.
    pub fn tags(&self) -> Vec<String> {
        if self.filters.is_empty() {
            return vec!["All Traffic".to_string()];
        }
        self.filters.iter().map(SessionFilter::tag).collect()
    }
}
