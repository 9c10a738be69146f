//! Dashboard state management
//!
//! The dashboard is a sequence of immutable [`DashboardState`] snapshots.
//! Each update (timer refresh, query completion, new insight) builds a new
//! snapshot from the previous one and publishes it on a watch channel.

use crate::console::QueryConsole;
use crate::generator::MetricGenerator;
use crate::insight::InsightClient;
use chrono::{DateTime, Utc};
use htap_common::{
    CategorySales, ClusterStatus, ConnectionConfig, DashboardConfig, Insight, MetricPoint,
    QueryResult, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Identifies one query submission. Only the latest ticket may install a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct QueryTicket(u64);

// =============================================================================
// Snapshot
// =============================================================================

/// One immutable view of everything the dashboard displays.
#[derive(Debug, Clone)]
pub struct DashboardState {
    status: ClusterStatus,
    series: Vec<MetricPoint>,
    category_sales: Vec<CategorySales>,
    last_query: Option<QueryResult>,
    pending: Option<QueryTicket>,
    query_seq: u64,
    insight: Option<Insight>,
    refreshed_at: DateTime<Utc>,
    sample_step: Duration,
}

impl DashboardState {
    pub fn initial(generator: &MetricGenerator, config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            status: generator.cluster_status(),
            series: generator.metric_series(config.window.max(1), config.sample_step)?,
            category_sales: generator.category_sales(),
            last_query: None,
            pending: None,
            query_seq: 0,
            insight: None,
            refreshed_at: Utc::now(),
            sample_step: config.sample_step,
        })
    }

    /// Next snapshot after a timer tick: fresh gauges, window shifted by one.
    pub fn refreshed(&self, generator: &MetricGenerator) -> Result<Self> {
        let mut series = self.series.clone();
        match series.last() {
            Some(last) => {
                let next = generator.next_point(last, self.sample_step)?;
                series.remove(0);
                series.push(next);
            }
            None => series = generator.metric_series(1, self.sample_step)?,
        }

        Ok(Self {
            status: generator.cluster_status(),
            series,
            category_sales: generator.category_sales(),
            refreshed_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Record a new submission and hand out its ticket.
    pub fn begin_query(&self) -> (Self, QueryTicket) {
        let ticket = QueryTicket(self.query_seq + 1);
        let next = Self {
            query_seq: ticket.0,
            pending: Some(ticket),
            ..self.clone()
        };
        (next, ticket)
    }

    /// Install a completed result unless a newer query has been submitted.
    pub fn with_query_result(&self, ticket: QueryTicket, result: QueryResult) -> Self {
        if ticket.0 != self.query_seq {
            tracing::debug!(
                "Discarding stale query result (ticket {}, latest {})",
                ticket.0,
                self.query_seq
            );
            return self.clone();
        }

        Self {
            last_query: Some(result),
            pending: None,
            ..self.clone()
        }
    }

    pub fn with_insight(&self, insight: Insight) -> Self {
        Self {
            insight: Some(insight),
            ..self.clone()
        }
    }

    pub fn status(&self) -> &ClusterStatus {
        &self.status
    }

    pub fn series(&self) -> &[MetricPoint] {
        &self.series
    }

    pub fn category_sales(&self) -> &[CategorySales] {
        &self.category_sales
    }

    pub fn last_query(&self) -> Option<&QueryResult> {
        self.last_query.as_ref()
    }

    pub fn is_query_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn insight(&self) -> Option<&Insight> {
        self.insight.as_ref()
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Publishes dashboard snapshots to any number of subscribers.
#[derive(Clone)]
pub struct Dashboard {
    tx: Arc<watch::Sender<DashboardState>>,
    generator: MetricGenerator,
    config: DashboardConfig,
}

impl Dashboard {
    /// Validate `config` and publish the initial snapshot.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let generator = MetricGenerator::new();
        let (tx, _rx) = watch::channel(DashboardState::initial(&generator, &config)?);
        Ok(Self {
            tx: Arc::new(tx),
            generator,
            config,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Publish one refreshed snapshot. A failed refresh keeps the current one.
    pub fn refresh(&self) {
        let generator = self.generator;
        self.tx.send_if_modified(|state| match state.refreshed(&generator) {
            Ok(next) => {
                *state = next;
                true
            }
            Err(e) => {
                tracing::warn!("Dashboard refresh skipped: {}", e);
                false
            }
        });
    }

    /// Start the timer that refreshes the dashboard every `refresh_interval`.
    /// Abort the returned handle to stop it.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let dashboard = self.clone();
        let period = self.config.refresh_interval;

        tokio::spawn(async move {
            tracing::info!("Dashboard refresh started (every {:?})", period);
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                dashboard.refresh();
            }
        })
    }

    /// Run a query through `console` and publish its result if still current.
    pub async fn run_query(
        &self,
        console: &QueryConsole,
        config: &ConnectionConfig,
        sql: &str,
    ) -> QueryResult {
        let mut ticket = QueryTicket::default();
        self.tx.send_modify(|state| {
            let (next, issued) = state.begin_query();
            *state = next;
            ticket = issued;
        });

        let result = console.run(config, sql).await;

        let published = result.clone();
        self.tx
            .send_modify(|state| *state = state.with_query_result(ticket, published));
        result
    }

    /// Fetch an insight for the current gauges and publish it.
    pub async fn refresh_insight(&self, client: &InsightClient) -> Insight {
        let status = *self.tx.borrow().status();
        let insight = client.get_insights(&status).await;

        let published = insight.clone();
        self.tx.send_modify(|state| *state = state.with_insight(published));
        insight
    }
}

// =============================================================================
// Tests
// =============================================================================
