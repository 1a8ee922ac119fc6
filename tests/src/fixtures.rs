//! Test fixtures and session generators.

use chrono::{DateTime, Duration, Utc};
use dashboard_core::SessionRecord;
use uuid::Uuid;

/// A real TikTok session that started `minutes_ago` minutes before `now`.
pub fn session_at(now: DateTime<Utc>, minutes_ago: i64) -> SessionRecord {
    let mut record = SessionRecord::new(Uuid::new_v4().to_string(), now - Duration::minutes(minutes_ago));
    record.utm_source = Some("tiktok".to_string());
    record.device_type = Some("mobile".to_string());
    record.city = Some("Austin".to_string());
    record.time_on_site_sec = 30.0;
    record.scroll_depth_pct = 50.0;
    record
}

/// A bot session.
pub fn bot_at(now: DateTime<Utc>, minutes_ago: i64) -> SessionRecord {
    let mut record = session_at(now, minutes_ago);
    record.is_bot = true;
    record
}

/// A session from another traffic source.
pub fn other_source_at(now: DateTime<Utc>, minutes_ago: i64, source: &str) -> SessionRecord {
    let mut record = session_at(now, minutes_ago);
    record.utm_source = Some(source.to_string());
    record
}

/// `n` hero-experiment sessions of one arm, the first `clicks` of which clicked buy.
pub fn hero_arm(now: DateTime<Utc>, variant: &str, n: usize, clicks: usize) -> Vec<SessionRecord> {
    (0..n)
        .map(|i| {
            let mut record = session_at(now, 5);
            record.hero_variant = Some(variant.to_string());
            record.clicked_buy = u64::from(i < clicks);
            record
        })
        .collect()
}

/// Raw row in the JSON export shape, as written by the instrumentation pipeline.
pub fn export_row(session_id: &str, started_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "session_id": session_id,
        "started_at": started_at.to_rfc3339(),
        "is_bot": null,
        "utm_source": "tiktok",
        "time_on_site_sec": 42.5,
        "scroll_depth_pct": 60,
        "clicked_buy": true,
        "hero_variant": "test"
    })
}
