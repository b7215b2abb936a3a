use crate::models::{AggregatedStat, Click, Report};
use crate::storage::{AnalyticsStore, LinkStore, StoreError, StoreResult};
use anyhow::anyhow;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// All-or-nothing report aggregation.
///
/// Reports read current state straight from the store; the link cache is
/// never consulted here. The three analytics queries run in parallel under
/// one cancellation token: the first branch to fail cancels the token,
/// remaining branches stop early, and the call returns that first error
/// with no partial report. Dropping the returned future tears down all
/// branches with it.
pub struct AnalyticsService {
    links: Arc<dyn LinkStore>,
    analytics: Arc<dyn AnalyticsStore>,
    recent_clicks_limit: i64,
}

enum Branch {
    ByDay(Vec<AggregatedStat>),
    ByUserAgent(Vec<AggregatedStat>),
    Recent(Vec<Click>),
}

impl AnalyticsService {
    pub fn new(
        links: Arc<dyn LinkStore>,
        analytics: Arc<dyn AnalyticsStore>,
        recent_clicks_limit: i64,
    ) -> Self {
        Self {
            links,
            analytics,
            recent_clicks_limit,
        }
    }

    pub async fn full_report(&self, short_code: &str) -> StoreResult<Report> {
        let link = self.links.get_by_code(short_code).await?;
        tracing::debug!(short_code, link_id = link.id, "building analytics report");

        let token = CancellationToken::new();
        let mut branches: JoinSet<StoreResult<Branch>> = JoinSet::new();

        {
            let analytics = Arc::clone(&self.analytics);
            let token = token.clone();
            let link_id = link.id;
            branches.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => Err(cancelled("clicks by day")),
                    res = analytics.clicks_by_day(link_id) => res.map(Branch::ByDay),
                }
            });
        }

        {
            let analytics = Arc::clone(&self.analytics);
            let token = token.clone();
            let link_id = link.id;
            branches.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => Err(cancelled("clicks by user agent")),
                    res = analytics.clicks_by_user_agent(link_id) => res.map(Branch::ByUserAgent),
                }
            });
        }

        {
            let analytics = Arc::clone(&self.analytics);
            let token = token.clone();
            let link_id = link.id;
            let limit = self.recent_clicks_limit;
            branches.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => Err(cancelled("recent clicks")),
                    res = analytics.recent_clicks(link_id, limit) => res.map(Branch::Recent),
                }
            });
        }

        let mut clicks_by_day = None;
        let mut clicks_by_user_agent = None;
        let mut recent_clicks = None;
        let mut first_err: Option<StoreError> = None;

        while let Some(joined) = branches.join_next().await {
            match joined {
                Ok(Ok(Branch::ByDay(stats))) => clicks_by_day = Some(stats),
                Ok(Ok(Branch::ByUserAgent(stats))) => clicks_by_user_agent = Some(stats),
                Ok(Ok(Branch::Recent(clicks))) => recent_clicks = Some(clicks),
                Ok(Err(err)) => {
                    token.cancel();
                    if first_err.is_none() {
                        tracing::warn!(short_code, error = %err, "analytics branch failed");
                        first_err = Some(err);
                    }
                }
                Err(join_err) => {
                    token.cancel();
                    if first_err.is_none() {
                        first_err = Some(StoreError::Other(join_err.into()));
                    }
                }
            }
        }

        if let Some(err) = first_err {
            return Err(err);
        }

        let (Some(clicks_by_day), Some(clicks_by_user_agent), Some(recent_clicks)) =
            (clicks_by_day, clicks_by_user_agent, recent_clicks)
        else {
            return Err(StoreError::Other(anyhow!(
                "analytics branch finished without a result"
            )));
        };

        // Counted from the bounded recent window, not a full COUNT query;
        // links with more clicks than the window under-report.
        let total_clicks = recent_clicks.len() as i64;

        Ok(Report {
            link,
            total_clicks,
            clicks_by_day,
            clicks_by_user_agent,
            recent_clicks,
        })
    }
}

fn cancelled(branch: &str) -> StoreError {
    StoreError::Other(anyhow!("{branch} query cancelled after sibling failure"))
}
