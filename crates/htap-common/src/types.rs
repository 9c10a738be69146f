//! HTAP Core Types
//!
//! Data model shared by the simulator, the gateway clients and the
//! dashboard state: engines, loosely-typed row values, query results,
//! cluster gauges and insights.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Engine
// =============================================================================

/// Execution engine that served (or would serve) a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Row-store path for point lookups and updates.
    #[default]
    Transactional,
    /// Columnar path for aggregate and join-heavy queries.
    Analytical,
}

impl Engine {
    /// Massively-parallel flag, true only for the analytical path.
    pub fn is_mpp(&self) -> bool {
        matches!(self, Self::Analytical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transactional => "transactional",
            Self::Analytical => "analytical",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Value
// =============================================================================

/// A loosely-typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Convert a JSON value from a remote row. Nested arrays and objects are
    /// kept as their compact JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Self::String(s),
            other => Self::String(other.to_string()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{:.2}", v),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

// =============================================================================
// Row
// =============================================================================

/// A result record: an ordered mapping from column name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing the value if the column already exists.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter().position(|c| *c == column) {
            Some(index) => self.values[index] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Query Result
// =============================================================================

/// Tabular result of a simulated or live query.
///
/// A result carrying an `error` always has no columns, no rows and a zero
/// execution time. Both constructors uphold that.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
    execution_time_ms: f64,
    engine: Engine,
    #[serde(rename = "isMPP")]
    is_mpp: bool,
    sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl QueryResult {
    /// Create a successful result. The MPP flag follows the engine.
    pub fn new(
        sql: impl Into<String>,
        engine: Engine,
        columns: Vec<String>,
        rows: Vec<Row>,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            columns,
            rows,
            execution_time_ms: execution_time_ms.max(0.0),
            engine,
            is_mpp: engine.is_mpp(),
            sql: sql.into(),
            error: None,
        }
    }

    /// Create a failed result with every other field defaulted.
    pub fn failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            execution_time_ms: 0.0,
            engine: Engine::Transactional,
            is_mpp: false,
            sql: sql.into(),
            error: Some(message.into()),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time_ms
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn is_mpp(&self) -> bool {
        self.is_mpp
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// =============================================================================
// Cluster Status
// =============================================================================

/// Snapshot of the five cluster gauges. Produced fresh per read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub region_count: u32,
    pub replica_count: u32,
    pub sync_lag_ms: f64,
    pub tp_qps: f64,
    pub ap_qps: f64,
}

// =============================================================================
// Insight
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Generated commentary about cluster health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
    pub recommendation: String,
    pub severity: Severity,
}

// =============================================================================
// Chart Data
// =============================================================================

/// One sample of the throughput/latency time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub tp_qps: f64,
    pub ap_qps: f64,
    pub latency_ms: f64,
    pub cpu_percent: f64,
}

/// Sales figures for one business category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: u32,
    pub order_count: u32,
}

// =============================================================================
// Tests
// =============================================================================
