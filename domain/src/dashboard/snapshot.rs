//! Dashboard data handed to the AI layer.
//!
//! Aggregation (fetching, sorting, filtering) happens upstream; these types
//! only carry the already-prepared values the prompts need.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A protocol row of the market overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub name: String,
    /// Total value locked, USD.
    pub tvl: f64,
}

/// Market overview, protocols already sorted by relevance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default, alias = "scatterData")]
    pub protocols: Vec<ProtocolSummary>,
}

impl MarketSnapshot {
    /// The first `n` protocols.
    pub fn top(&self, n: usize) -> &[ProtocolSummary] {
        &self.protocols[..n.min(self.protocols.len())]
    }
}

/// One point of a protocol's TVL breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlPoint {
    #[serde(rename = "totalLiquidityUSD")]
    pub total_liquidity_usd: f64,
}

/// Detail record of a single protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDetails {
    pub name: String,
    #[serde(default)]
    pub tvl: Vec<TvlPoint>,
    #[serde(default)]
    pub change_7d: Option<f64>,
    /// Upstream sources report audits as a list, a count string, a flag, or not at all.
    #[serde(default)]
    pub audits: Option<Value>,
}

/// How much is known about a protocol's audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Count(usize),
    Yes,
    Unknown,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Count(n) => write!(f, "{}", n),
            AuditStatus::Yes => f.write_str("Yes"),
            AuditStatus::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Metrics derived from [`ProtocolDetails`] for the risk report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolMetrics {
    pub name: String,
    pub tvl: f64,
    pub change_7d: Option<f64>,
    pub audits: AuditStatus,
}

impl ProtocolDetails {
    pub fn metrics(&self) -> ProtocolMetrics {
        ProtocolMetrics {
            name: self.name.clone(),
            tvl: self.tvl.iter().map(|p| p.total_liquidity_usd).sum(),
            change_7d: self.change_7d,
            audits: audit_status(self.audits.as_ref()),
        }
    }
}

fn audit_status(audits: Option<&Value>) -> AuditStatus {
    match audits {
        Some(Value::Array(list)) if !list.is_empty() => AuditStatus::Count(list.len()),
        Some(value) if is_truthy(value) => AuditStatus::Yes,
        _ => AuditStatus::Unknown,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(audits: Option<Value>) -> ProtocolDetails {
        ProtocolDetails {
            name: "Aave".to_string(),
            tvl: vec![
                TvlPoint {
                    total_liquidity_usd: 1.5e9,
                },
                TvlPoint {
                    total_liquidity_usd: 2.0e9,
                },
            ],
            change_7d: Some(-3.2),
            audits,
        }
    }

    #[test]
    fn tvl_is_summed() {
        assert_eq!(details(None).metrics().tvl, 3.5e9);
    }

    #[test]
    fn audit_status_variants() {
        assert_eq!(
            details(Some(json!(["a", "b", "c"]))).metrics().audits,
            AuditStatus::Count(3)
        );
        assert_eq!(details(Some(json!("2"))).metrics().audits, AuditStatus::Yes);
        assert_eq!(details(Some(json!([]))).metrics().audits, AuditStatus::Yes);
        assert_eq!(details(Some(json!("0"))).metrics().audits, AuditStatus::Yes);
        assert_eq!(details(Some(json!(0))).metrics().audits, AuditStatus::Unknown);
        assert_eq!(details(Some(json!(""))).metrics().audits, AuditStatus::Unknown);
        assert_eq!(details(Some(Value::Null)).metrics().audits, AuditStatus::Unknown);
        assert_eq!(details(None).metrics().audits, AuditStatus::Unknown);
    }

    #[test]
    fn deserialize_upstream_shape() {
        let details: ProtocolDetails = serde_json::from_value(json!({
            "name": "Lido",
            "tvl": [{"date": 1, "totalLiquidityUSD": 10.0}],
            "audits": "2",
            "category": "Liquid Staking"
        }))
        .unwrap();
        assert_eq!(details.change_7d, None);
        assert_eq!(details.metrics().tvl, 10.0);
    }

    #[test]
    fn snapshot_top_is_bounded() {
        let snapshot: MarketSnapshot = serde_json::from_value(json!({
            "scatterData": [{"name": "A", "tvl": 1.0}, {"name": "B", "tvl": 2.0}]
        }))
        .unwrap();
        assert_eq!(snapshot.top(5).len(), 2);
        assert_eq!(snapshot.top(1)[0].name, "A");
        assert!(MarketSnapshot::default().top(5).is_empty());
    }
}
