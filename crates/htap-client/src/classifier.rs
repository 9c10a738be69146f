//! HTAP Query Classifier
//!
//! Substring heuristic that routes a SQL string to the transactional or the
//! analytical engine. There is no SQL parsing here: markers inside string
//! literals or comments count the same as real clauses.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use htap_common::Engine;

/// Uppercase markers that send a query to the analytical engine.
pub const ANALYTICAL_MARKERS: &[&str] = &["GROUP BY", "JOIN", "SUM(", "COUNT("];

/// Classify a query by case-insensitive substring match.
pub fn classify(sql: &str) -> Engine {
    let normalized = sql.to_uppercase();

    if ANALYTICAL_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        Engine::Analytical
    } else {
        Engine::Transactional
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates_are_analytical() {
        assert_eq!(
            classify("SELECT category, SUM(amount) FROM orders GROUP BY category"),
            Engine::Analytical
        );
        assert_eq!(classify("select count(*) from orders"), Engine::Analytical);
        assert_eq!(
            classify("SELECT * FROM a inner join b ON a.id = b.id"),
            Engine::Analytical
        );
        assert_eq!(classify("select region from t Group By region"), Engine::Analytical);
    }

    #[test]
    fn test_point_queries_are_transactional() {
        assert_eq!(classify("SELECT * FROM orders LIMIT 10"), Engine::Transactional);
        assert_eq!(
            classify("UPDATE orders SET status = 'done' WHERE id = 1"),
            Engine::Transactional
        );
        assert_eq!(classify(""), Engine::Transactional);
    }

    #[test]
    fn test_marker_requires_exact_spacing() {
        // "SUM (" and "GROUPBY" do not match the markers.
        assert_eq!(classify("SELECT SUM (x) FROM t"), Engine::Transactional);
        assert_eq!(classify("SELECT x FROM t GROUPBY x"), Engine::Transactional);
    }

    #[test]
    fn test_markers_inside_literals_still_match() {
        assert_eq!(
            classify("SELECT * FROM notes WHERE body = 'please join us'"),
            Engine::Analytical
        );
        assert_eq!(
            classify("SELECT id FROM t -- count(*) later"),
            Engine::Analytical
        );
    }

    #[test]
    fn test_every_marker_in_any_case() {
        for marker in ANALYTICAL_MARKERS {
            let lower = format!("select {} x", marker.to_lowercase());
            assert_eq!(classify(&lower), Engine::Analytical, "{}", lower);
            assert!(classify(&lower).is_mpp());
        }
    }
}
