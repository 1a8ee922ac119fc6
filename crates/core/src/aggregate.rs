//! Period metric aggregation.
//!
//! Reduces an already windowed and filtered record set into a
//! [`PeriodMetrics`] summary. Aggregation never fails: an empty input yields
//! all zeros so the dashboard always has something to show.

use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;
use crate::thresholds::Thresholds;

/// Summary of one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub sessions: u64,
    /// Median seconds over sessions with `0 < time <= cap`
    pub median_time: f64,
    /// Median percent over sessions with non-zero scroll
    pub median_scroll: f64,
    pub total_clicks: u64,
    pub clicked_buy: u64,
    pub initiated_checkout: u64,
    pub purchased: u64,
    /// Percent of sessions without time or scroll signal
    pub bounce_rate: f64,
    pub engaged_sessions: u64,
}

impl PeriodMetrics {
    /// Engaged sessions as a percent of all sessions.
    pub fn engaged_rate(&self) -> f64 {
        rate(self.engaged_sessions, self.sessions)
    }

    /// Buy clicks per session, in percent.
    pub fn click_rate(&self) -> f64 {
        rate(self.clicked_buy, self.sessions)
    }

    pub fn checkout_rate(&self) -> f64 {
        rate(self.initiated_checkout, self.sessions)
    }

    pub fn purchase_rate(&self) -> f64 {
        rate(self.purchased, self.sessions)
    }
}

/// Aggregates records into period metrics.
pub fn calculate_metrics<'a, I>(records: I, thresholds: &Thresholds) -> PeriodMetrics
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let mut m = PeriodMetrics::default();
    let mut valid_time = Vec::new();
    let mut valid_scroll = Vec::new();
    let mut bounces = 0u64;

    for r in records {
        m.sessions += 1;

        if r.has_valid_time(thresholds) {
            valid_time.push(r.time_on_site_sec);
        }
        if r.has_valid_scroll() {
            valid_scroll.push(r.scroll_depth_pct);
        }
        if r.is_bounce() {
            bounces += 1;
        }
        if r.is_engaged(thresholds) {
            m.engaged_sessions += 1;
        }

        m.total_clicks += r.clicks_total;
        m.clicked_buy += r.clicked_buy;
        m.initiated_checkout += r.initiated_checkout;
        m.purchased += r.purchased;
    }

    m.median_time = median(&mut valid_time).unwrap_or(0.0);
    m.median_scroll = median(&mut valid_scroll).unwrap_or(0.0);
    m.bounce_rate = rate(bounces, m.sessions);
    m
}

/// Median of the values; the mean of the two middle values for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(time: f64, scroll: f64) -> SessionRecord {
        let mut r = SessionRecord::new("s", Utc::now());
        r.time_on_site_sec = time;
        r.scroll_depth_pct = scroll;
        r
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let empty: Vec<SessionRecord> = vec![];
        let m = calculate_metrics(&empty, &Thresholds::default());
        assert_eq!(m, PeriodMetrics::default());
        assert_eq!(calculate_metrics(&empty, &Thresholds::default()), m);
    }

    #[test]
    fn test_bounce_rate_sixty_percent() {
        let mut records: Vec<_> = [5.0, 10.0, 15.0, 20.0]
            .iter()
            .map(|&t| session(t, 50.0))
            .collect();
        records.extend((0..6).map(|_| session(0.0, 50.0)));

        let m = calculate_metrics(&records, &Thresholds::default());
        assert_eq!(m.sessions, 10);
        assert!((m.bounce_rate - 60.0).abs() < 1e-9);
        assert_eq!(m.median_time, 12.5);
    }

    #[test]
    fn test_clicked_buy_funnel() {
        let records: Vec<_> = [1, 0, 1, 1, 0, 0, 0, 0, 0, 0]
            .iter()
            .map(|&c| {
                let mut r = session(30.0, 40.0);
                r.clicked_buy = c;
                r
            })
            .collect();

        let m = calculate_metrics(&records, &Thresholds::default());
        assert_eq!(m.clicked_buy, 3);
        assert!((m.click_rate() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_time_ignored_by_median() {
        let base = vec![session(20.0, 10.0), session(40.0, 10.0), session(60.0, 10.0)];
        let mut with_outlier = base.clone();
        with_outlier.push(session(2000.0, 10.0));

        let t = Thresholds::default();
        assert_eq!(calculate_metrics(&base, &t).median_time, 40.0);
        assert_eq!(calculate_metrics(&with_outlier, &t).median_time, 40.0);
    }

    #[test]
    fn test_engaged_and_bounce_bounds() {
        let records = vec![
            session(11.0, 26.0),
            session(300.0, 90.0),
            session(5.0, 80.0),
            session(0.0, 0.0),
        ];
        let m = calculate_metrics(&records, &Thresholds::default());
        assert_eq!(m.engaged_sessions, 2);
        assert!(m.engaged_sessions <= m.sessions);
        assert!((0.0..=100.0).contains(&m.bounce_rate));
        assert_eq!(m.median_scroll, 80.0);
        assert!((m.engaged_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0]), Some(3.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
