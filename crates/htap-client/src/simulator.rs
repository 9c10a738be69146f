//! HTAP Query Simulator
//!
//! Fabricates plausible tabular results for a SQL string without touching
//! any backend. The shape depends only on how the classifier routes the
//! query: aggregates get a per-category summary, everything else gets a
//! page of order rows.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::classifier::classify;
use crate::generator::CATEGORIES;
use chrono::{SecondsFormat, Utc};
use htap_common::{Engine, QueryResult, Row, SimulatorConfig};
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

pub const ANALYTICAL_COLUMNS: [&str; 4] = ["category", "total_sales", "avg_price", "order_count"];
pub const TRANSACTIONAL_COLUMNS: [&str; 5] = ["id", "user_id", "amount", "status", "created_at"];

const ANALYTICAL_ROWS: usize = 5;
const TRANSACTIONAL_ROWS: usize = 10;

// Disjoint so the two engines are easy to tell apart on screen.
const ANALYTICAL_TIME_MS: Range<f64> = 45.0..65.0;
const TRANSACTIONAL_TIME_MS: Range<f64> = 2.0..7.0;

// =============================================================================
// Simulator
// =============================================================================

/// Mock query backend.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Simulate a query after an artificial delay. Never fails.
    pub async fn simulate(&self, sql: &str) -> QueryResult {
        let delay = self.pick_delay(&mut rand::thread_rng());
        tracing::debug!("Simulating query with {:?} artificial latency", delay);
        tokio::time::sleep(delay).await;

        fabricate(sql, &mut rand::thread_rng())
    }

    fn pick_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.config.min_latency;
        let max = self.config.max_latency;
        if max <= min {
            return min;
        }
        rng.gen_range(min..max)
    }
}

/// Build the simulated result for `sql` with no delay.
pub fn fabricate<R: Rng + ?Sized>(sql: &str, rng: &mut R) -> QueryResult {
    let engine = classify(sql);

    let (columns, rows, time_range) = match engine {
        Engine::Analytical => (
            to_strings(&ANALYTICAL_COLUMNS),
            analytical_rows(rng),
            ANALYTICAL_TIME_MS,
        ),
        Engine::Transactional => (
            to_strings(&TRANSACTIONAL_COLUMNS),
            transactional_rows(rng),
            TRANSACTIONAL_TIME_MS,
        ),
    };

    let execution_time_ms = rng.gen_range(time_range);
    QueryResult::new(sql, engine, columns, rows, execution_time_ms)
}

fn analytical_rows<R: Rng + ?Sized>(rng: &mut R) -> Vec<Row> {
    (0..ANALYTICAL_ROWS)
        .map(|i| {
            Row::new()
                .with("category", CATEGORIES[i % CATEGORIES.len()])
                .with("total_sales", rng.gen_range(0..100_000i64))
                .with("avg_price", round2(rng.gen_range(0.0..200.0)))
                .with("order_count", rng.gen_range(0..500i64))
        })
        .collect()
}

fn transactional_rows<R: Rng + ?Sized>(rng: &mut R) -> Vec<Row> {
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    (0..TRANSACTIONAL_ROWS as i64)
        .map(|i| {
            Row::new()
                .with("id", 1000 + i)
                .with("user_id", 500 + i)
                .with("amount", round2(rng.gen_range(0.0..1000.0)))
                .with("status", "completed")
                .with("created_at", created_at.clone())
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use htap_common::Value;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    const AGGREGATE_SQL: &str = "SELECT category, SUM(amount) FROM orders GROUP BY category";
    const POINT_SQL: &str = "SELECT * FROM orders LIMIT 10";

    fn instant() -> Simulator {
        Simulator::new(SimulatorConfig::instant())
    }

    #[tokio::test]
    async fn test_analytical_shape() {
        let result = instant().simulate(AGGREGATE_SQL).await;

        assert_eq!(result.engine(), Engine::Analytical);
        assert!(result.is_mpp());
        assert_eq!(result.columns(), &ANALYTICAL_COLUMNS);
        assert_eq!(result.row_count(), 5);
        assert!(result.error().is_none());
        assert_eq!(result.sql(), AGGREGATE_SQL);

        let categories: Vec<&str> = result
            .rows()
            .iter()
            .map(|r| r.get_by_name("category").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(categories, CATEGORIES);
    }

    #[tokio::test]
    async fn test_transactional_shape() {
        let result = instant().simulate(POINT_SQL).await;

        assert_eq!(result.engine(), Engine::Transactional);
        assert!(!result.is_mpp());
        assert_eq!(result.columns(), &TRANSACTIONAL_COLUMNS);
        assert_eq!(result.row_count(), 10);
        assert!(result.error().is_none());

        for (i, row) in result.rows().iter().enumerate() {
            assert_eq!(row.get_by_name("id"), Some(&Value::Int(1000 + i as i64)));
            assert_eq!(row.get_by_name("user_id"), Some(&Value::Int(500 + i as i64)));
            assert_eq!(row.get_by_name("status"), Some(&Value::from("completed")));
            let created_at = row.get_by_name("created_at").and_then(Value::as_str).unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
        }
    }

    #[test]
    fn test_value_ranges() {
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let result = fabricate(AGGREGATE_SQL, &mut rng);
            assert!(ANALYTICAL_TIME_MS.contains(&result.execution_time_ms()));
            for row in result.rows() {
                let sales = row.get_by_name("total_sales").and_then(Value::as_int).unwrap();
                let price = row.get_by_name("avg_price").and_then(Value::as_float).unwrap();
                let orders = row.get_by_name("order_count").and_then(Value::as_int).unwrap();
                assert!((0..100_000).contains(&sales));
                assert!((0.0..=200.0).contains(&price));
                assert!((0..500).contains(&orders));
                assert_eq!(round2(price), price);
            }

            let result = fabricate(POINT_SQL, &mut rng);
            assert!(TRANSACTIONAL_TIME_MS.contains(&result.execution_time_ms()));
            for row in result.rows() {
                let amount = row.get_by_name("amount").and_then(Value::as_float).unwrap();
                assert!((0.0..=1000.0).contains(&amount));
            }
        }
    }

    #[tokio::test]
    async fn test_default_latency_lower_bound() {
        let simulator = Simulator::default();
        let start = Instant::now();
        let result = simulator.simulate(POINT_SQL).await;

        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(!result.is_error());
    }

    #[test]
    fn test_degenerate_latency_window() {
        let simulator = Simulator::new(SimulatorConfig {
            min_latency: Duration::from_millis(10),
            max_latency: Duration::from_millis(5),
        });
        let delay = simulator.pick_delay(&mut StdRng::seed_from_u64(0));
        assert_eq!(delay, Duration::from_millis(10));
    }
}
