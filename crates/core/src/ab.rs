//! A/B experiment statistics.
//!
//! Variants are discovered from the data in first-seen order; any label is
//! accepted, but lift is only computed between the labels `control` and
//! `test`. The winner call is a fixed band around zero lift, not a
//! significance test.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::{calculate_metrics, PeriodMetrics};
use crate::error::{Error, Result};
use crate::schema::{Column, Dataset};
use crate::session::SessionRecord;
use crate::thresholds::Thresholds;

pub const CONTROL_LABEL: &str = "control";
pub const TEST_LABEL: &str = "test";

/// Experiment-assignment field to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantField {
    HeroVariant,
    SocialProofVariant,
    ScrollHookVariant,
    HeroTestId,
}

impl VariantField {
    /// The experiments shown on the dashboard, in display order.
    pub const PANELS: [VariantField; 3] = [
        Self::HeroVariant,
        Self::SocialProofVariant,
        Self::ScrollHookVariant,
    ];

    pub fn column(&self) -> Column {
        match self {
            Self::HeroVariant => Column::HeroVariant,
            Self::SocialProofVariant => Column::SocialProofVariant,
            Self::ScrollHookVariant => Column::ScrollHookVariant,
            Self::HeroTestId => Column::HeroTestId,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.column().as_str()
    }

    /// Experiment name for panel headers.
    pub fn title(&self) -> &'static str {
        match self {
            Self::HeroVariant => "Hero Section",
            Self::SocialProofVariant => "Social Proof",
            Self::ScrollHookVariant => "Scroll Hook",
            Self::HeroTestId => "Hero Test Round",
        }
    }

    pub fn value<'a>(&self, record: &'a SessionRecord) -> Option<&'a str> {
        match self {
            Self::HeroVariant => record.hero_variant.as_deref(),
            Self::SocialProofVariant => record.social_proof_variant.as_deref(),
            Self::ScrollHookVariant => record.scroll_hook_variant.as_deref(),
            Self::HeroTestId => record.hero_test_id.as_deref(),
        }
    }
}

impl fmt::Display for VariantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hero_variant" | "hero" => Ok(Self::HeroVariant),
            "social_proof_variant" | "social_proof" => Ok(Self::SocialProofVariant),
            "scroll_hook_variant" | "scroll_hook" => Ok(Self::ScrollHookVariant),
            "hero_test_id" => Ok(Self::HeroTestId),
            _ => Err(Error::validation(format!("unknown variant field: {}", s))),
        }
    }
}

/// Per-variant slice of the period metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStats {
    pub variant: String,
    pub sessions: u64,
    pub median_time: f64,
    pub median_scroll: f64,
    pub clicked_buy: u64,
    /// Buy clicks per session, in percent
    pub click_rate: f64,
    pub bounce_rate: f64,
    pub engaged: u64,
}

impl VariantStats {
    pub fn from_metrics(variant: impl Into<String>, m: &PeriodMetrics) -> Self {
        Self {
            variant: variant.into(),
            sessions: m.sessions,
            median_time: m.median_time,
            median_scroll: m.median_scroll,
            clicked_buy: m.clicked_buy,
            click_rate: m.click_rate(),
            bounce_rate: m.bounce_rate,
            engaged: m.engaged_sessions,
        }
    }
}

/// Winner call for a lift value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TestWinning,
    ControlWinning,
    NoClearWinner,
}

impl Verdict {
    /// Classifies lift against a symmetric dead zone (bounds inclusive).
    pub fn classify(lift: f64, dead_zone_pct: f64) -> Self {
        if lift > dead_zone_pct {
            Self::TestWinning
        } else if lift < -dead_zone_pct {
            Self::ControlWinning
        } else {
            Self::NoClearWinner
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TestWinning => "Test winning",
            Self::ControlWinning => "Control winning",
            Self::NoClearWinner => "No clear winner",
        }
    }
}

/// Control-vs-test comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftReport {
    pub control: VariantStats,
    pub test: VariantStats,
    /// Relative click-rate change of test over control, in percent
    pub lift: f64,
    pub verdict: Verdict,
}

/// Variant stats for one experiment field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABStats {
    pub field: VariantField,
    pub variants: Vec<VariantStats>,
}

impl ABStats {
    pub fn variant(&self, label: &str) -> Option<&VariantStats> {
        self.variants.iter().find(|v| v.variant == label)
    }

    /// Lift of `test` over `control`.
    ///
    /// Fails with `InsufficientVariants` unless both labels are present.
    /// A control click rate of zero gives a lift of 0.
    pub fn lift(&self, thresholds: &Thresholds) -> Result<LiftReport> {
        let (control, test) = match (self.variant(CONTROL_LABEL), self.variant(TEST_LABEL)) {
            (Some(c), Some(t)) => (c, t),
            _ => {
                return Err(Error::insufficient_variants(format!(
                    "{} needs both '{}' and '{}' variants, found {}",
                    self.field,
                    CONTROL_LABEL,
                    TEST_LABEL,
                    self.variants.len()
                )))
            }
        };

        let lift = lift_between(control.click_rate, test.click_rate);

        Ok(LiftReport {
            control: control.clone(),
            test: test.clone(),
            lift,
            verdict: Verdict::classify(lift, thresholds.lift_dead_zone_pct),
        })
    }
}

/// `(test - control) / control * 100`, 0 when control's rate is 0.
pub fn lift_between(control_rate: f64, test_rate: f64) -> f64 {
    if control_rate > 0.0 {
        (test_rate - control_rate) / control_rate * 100.0
    } else {
        0.0
    }
}

/// Groups records by a key, keeping groups in first-seen order.
///
/// Records whose key is `None` are dropped.
pub fn group_first_seen<'a, K, F>(records: &'a [SessionRecord], key: F) -> Vec<(K, Vec<&'a SessionRecord>)>
where
    K: PartialEq,
    F: Fn(&'a SessionRecord) -> Option<K>,
{
    let mut groups: Vec<(K, Vec<&'a SessionRecord>)> = Vec::new();
    for record in records {
        let Some(k) = key(record) else { continue };
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(record),
            None => groups.push((k, vec![record])),
        }
    }
    groups
}

/// Per-variant stats for `field`, or `None` when the column is absent from
/// the dataset or there are no records.
pub fn calculate_ab_stats(
    dataset: &Dataset,
    field: VariantField,
    thresholds: &Thresholds,
) -> Option<ABStats> {
    if dataset.is_empty() || dataset.require_column(field.column()).is_err() {
        return None;
    }

    let variants = group_first_seen(dataset.records(), |r| field.value(r))
        .into_iter()
        .map(|(label, members)| {
            let m = calculate_metrics(members, thresholds);
            VariantStats::from_metrics(label, &m)
        })
        .collect();

    Some(ABStats { field, variants })
}

/// Outcome shown in an experiment panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AbOutcome {
    Compared(LiftReport),
    InsufficientData,
}

/// One experiment panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbPanel {
    pub field: VariantField,
    pub title: String,
    pub variants: Vec<VariantStats>,
    pub outcome: AbOutcome,
}

impl AbPanel {
    /// Builds the panel, degrading to "insufficient data" instead of failing.
    pub fn build(dataset: &Dataset, field: VariantField, thresholds: &Thresholds) -> Self {
        let stats = calculate_ab_stats(dataset, field, thresholds);
        let outcome = match stats.as_ref().map(|s| s.lift(thresholds)) {
            Some(Ok(report)) => AbOutcome::Compared(report),
            Some(Err(_)) | None => AbOutcome::InsufficientData,
        };

        Self {
            field,
            title: field.title().to_string(),
            variants: stats.map(|s| s.variants).unwrap_or_default(),
            outcome,
        }
    }
}
