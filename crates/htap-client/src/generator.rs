//! HTAP Metric Generator
//!
//! Synthetic cluster gauges, throughput time series and business figures
//! for the dashboard charts. Every operation has a `_with` variant that
//! takes the RNG explicitly so seeded runs are reproducible.
//!
//! Time series calls fail with a configuration error when the step is zero
//! or the requested span leaves the representable timestamp range.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::{DateTime, Utc};
use htap_common::{CategorySales, ClusterStatus, HtapError, MetricPoint, Result};
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

/// Business categories shown by both the sales chart and the simulator.
pub const CATEGORIES: [&str; 5] = ["Electronics", "Home", "Apparel", "Books", "Toys"];

const REGION_COUNT: Range<u32> = 3..6;
const REPLICA_COUNT: Range<u32> = 3..10;
const SYNC_LAG_MS: Range<f64> = 5.0..50.0;
const TP_QPS: Range<f64> = 12_000.0..18_000.0;
const AP_QPS: Range<f64> = 200.0..800.0;
const LATENCY_MS: Range<f64> = 1.0..20.0;
const CPU_PERCENT: Range<f64> = 20.0..80.0;
const TOTAL_SALES_BOUND: u32 = 100_000;
const ORDER_COUNT_BOUND: u32 = 500;

// =============================================================================
// Metric Generator
// =============================================================================

/// Stateless source of synthetic dashboard data.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricGenerator;

impl MetricGenerator {
    pub fn new() -> Self {
        Self
    }

    /// A fresh snapshot of the cluster gauges.
    pub fn cluster_status(&self) -> ClusterStatus {
        self.cluster_status_with(&mut rand::thread_rng())
    }

    pub fn cluster_status_with<R: Rng + ?Sized>(&self, rng: &mut R) -> ClusterStatus {
        ClusterStatus {
            region_count: rng.gen_range(REGION_COUNT),
            replica_count: rng.gen_range(REPLICA_COUNT),
            sync_lag_ms: rng.gen_range(SYNC_LAG_MS),
            tp_qps: rng.gen_range(TP_QPS),
            ap_qps: rng.gen_range(AP_QPS),
        }
    }

    /// `points` samples ending now, spaced by `step`.
    pub fn metric_series(&self, points: usize, step: Duration) -> Result<Vec<MetricPoint>> {
        self.metric_series_with(&mut rand::thread_rng(), Utc::now(), points, step)
    }

    pub fn metric_series_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        end: DateTime<Utc>,
        points: usize,
        step: Duration,
    ) -> Result<Vec<MetricPoint>> {
        if step.is_zero() {
            return Err(zero_step());
        }
        (0..points)
            .rev()
            .map(|back| {
                let timestamp = end
                    .checked_sub_signed(span(step, back)?)
                    .ok_or_else(|| out_of_range(step, back))?;
                Ok(self.point_at_with(rng, timestamp))
            })
            .collect()
    }

    /// The sample that follows `previous` by `step`.
    pub fn next_point(&self, previous: &MetricPoint, step: Duration) -> Result<MetricPoint> {
        self.next_point_with(&mut rand::thread_rng(), previous, step)
    }

    pub fn next_point_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        previous: &MetricPoint,
        step: Duration,
    ) -> Result<MetricPoint> {
        if step.is_zero() {
            return Err(zero_step());
        }
        let timestamp = previous
            .timestamp
            .checked_add_signed(span(step, 1)?)
            .ok_or_else(|| out_of_range(step, 1))?;
        Ok(self.point_at_with(rng, timestamp))
    }

    fn point_at_with<R: Rng + ?Sized>(&self, rng: &mut R, timestamp: DateTime<Utc>) -> MetricPoint {
        MetricPoint {
            timestamp,
            tp_qps: rng.gen_range(TP_QPS),
            ap_qps: rng.gen_range(AP_QPS),
            latency_ms: rng.gen_range(LATENCY_MS),
            cpu_percent: rng.gen_range(CPU_PERCENT),
        }
    }

    /// One entry per category, in the fixed category order.
    pub fn category_sales(&self) -> Vec<CategorySales> {
        self.category_sales_with(&mut rand::thread_rng())
    }

    pub fn category_sales_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<CategorySales> {
        CATEGORIES
            .iter()
            .map(|category| CategorySales {
                category: category.to_string(),
                total_sales: rng.gen_range(0..TOTAL_SALES_BOUND),
                order_count: rng.gen_range(0..ORDER_COUNT_BOUND),
            })
            .collect()
    }
}

/// `step * count` as a chrono duration.
fn span(step: Duration, count: usize) -> Result<chrono::Duration> {
    u32::try_from(count)
        .ok()
        .and_then(|n| step.checked_mul(n))
        .and_then(|total| chrono::Duration::from_std(total).ok())
        .ok_or_else(|| out_of_range(step, count))
}

fn zero_step() -> HtapError {
    HtapError::Configuration("sample step must be greater than zero".to_string())
}

fn out_of_range(step: Duration, count: usize) -> HtapError {
    HtapError::Configuration(format!(
        "sample step {:?} x {} is outside the timestamp range",
        step, count
    ))
}

// =============================================================================
// Tests
// =============================================================================
