use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Click, Link};

/// A single aggregated data point, e.g. key "2026-08-23" / value 25 or
/// key "Mozilla/5.0 ..." / value 150.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AggregatedStat {
    pub key: String,
    pub value: i64,
}

/// The full analytics report for one link. Built fresh per request and
/// discarded after serialization; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub link: Link,
    /// Size of `recent_clicks`, not a full historical count. Links with
    /// more clicks than the recent-clicks bound under-report here.
    pub total_clicks: i64,
    pub clicks_by_day: Vec<AggregatedStat>,
    pub clicks_by_user_agent: Vec<AggregatedStat>,
    pub recent_clicks: Vec<Click>,
}
