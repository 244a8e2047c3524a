use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Maximum loss of a position. Short premium structures have no loss cap;
/// that case is a tagged variant rather than a large finite sentinel, so
/// downstream arithmetic cannot silently treat it as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum MaxLoss {
    Finite(Money),
    Unlimited,
}

impl MaxLoss {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, MaxLoss::Unlimited)
    }

    pub fn finite(&self) -> Option<Money> {
        match self {
            MaxLoss::Finite(amount) => Some(*amount),
            MaxLoss::Unlimited => None,
        }
    }
}

/// Net premium to open the position, per share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum NetPremium {
    Debit(Money),
    Credit(Money),
}

impl NetPremium {
    /// Per-share premium magnitude regardless of direction.
    pub fn per_share(&self) -> Money {
        match self {
            NetPremium::Debit(amount) | NetPremium::Credit(amount) => *amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
    Unlimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitZoneKind {
    /// Position profits when the underlying expires between the bounds.
    Between,
    /// Position profits when the underlying expires outside the bounds.
    Outside,
}

/// Price band bounded by the breakevens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitZone {
    pub lower: Money,
    pub upper: Money,
    pub kind: ProfitZoneKind,
}

/// One sample of the expiry P&L curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PLPoint {
    pub price: Money,
    pub profit_loss: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
