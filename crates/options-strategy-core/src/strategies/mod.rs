//! The five supported strategies. Each submodule implements the same
//! capability set over its own strict leg struct: strike selection against
//! a quoted chain, pure position math, expiry P&L evaluation, and static
//! metadata. Dispatch is a closed enum match in `factory`, so a missing
//! capability is a compile error rather than a runtime lookup failure.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::StrategyEngineError;
use crate::types::{MaxLoss, Money, NetPremium, ProfitZone, Rate, RiskProfile};
use crate::EngineResult;

pub mod butterfly;
pub mod calendar;
pub mod iron_condor;
pub mod long_strangle;
pub mod short_strangle;

/// Standard US equity option contract multiplier.
pub const CONTRACT_MULTIPLIER: Decimal = dec!(100);

/// Fallback implied volatility when the caller supplies none. Use of the
/// fallback is surfaced as a warning, never silently.
pub const DEFAULT_IV: Rate = dec!(0.30);

// ---------------------------------------------------------------------------
// Strategy identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    LongStrangle,
    ShortStrangle,
    IronCondor,
    ButterflySpread,
    DiagonalCalendar,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::LongStrangle,
        StrategyKind::ShortStrangle,
        StrategyKind::IronCondor,
        StrategyKind::ButterflySpread,
        StrategyKind::DiagonalCalendar,
    ];

    /// Stable identifier used at the caller boundary.
    pub fn identifier(&self) -> &'static str {
        match self {
            StrategyKind::LongStrangle => "long_strangle",
            StrategyKind::ShortStrangle => "short_strangle",
            StrategyKind::IronCondor => "iron_condor",
            StrategyKind::ButterflySpread => "butterfly_spread",
            StrategyKind::DiagonalCalendar => "diagonal_calendar",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::LongStrangle => "Long Strangle",
            StrategyKind::ShortStrangle => "Short Strangle",
            StrategyKind::IronCondor => "Iron Condor",
            StrategyKind::ButterflySpread => "Butterfly Spread",
            StrategyKind::DiagonalCalendar => "Diagonal Calendar Spread",
        }
    }

    /// Parse a caller-supplied identifier. Unknown names fail with
    /// `StrategyNotImplemented` rather than defaulting.
    pub fn from_identifier(name: &str) -> EngineResult<StrategyKind> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.identifier() == name)
            .ok_or_else(|| StrategyEngineError::StrategyNotImplemented { name: name.into() })
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInputs {
    pub strategy: StrategyKind,
    pub symbol: String,
    pub current_price: Money,
    pub expiration: NaiveDate,
    pub days_to_expiry: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_percentile: Option<Decimal>,
}

impl StrategyInputs {
    /// Implied volatility to report, plus whether the default was used.
    pub fn resolve_iv(&self) -> (Rate, bool) {
        match self.implied_volatility {
            Some(iv) => (iv, false),
            None => (DEFAULT_IV, true),
        }
    }
}

/// Input sanity checks shared by every strategy's `calculate`.
pub fn validate_inputs(inputs: &StrategyInputs) -> EngineResult<()> {
    if inputs.symbol.trim().is_empty() {
        return Err(StrategyEngineError::InvalidInput {
            field: "symbol".into(),
            reason: "must not be empty".into(),
        });
    }
    if inputs.current_price <= Decimal::ZERO {
        return Err(StrategyEngineError::InvalidInput {
            field: "current_price".into(),
            reason: "must be positive".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-strategy leg structures
// ---------------------------------------------------------------------------

/// OTM put + OTM call, same expiration. Used by both the long and the
/// short strangle; the side is implied by the strategy kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrangleLegs {
    pub put_strike: Money,
    pub put_premium: Money,
    pub call_strike: Money,
    pub call_premium: Money,
}

impl StrangleLegs {
    pub fn total_premium(&self) -> Money {
        self.put_premium + self.call_premium
    }
}

/// Short put spread + short call spread, same expiration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IronCondorLegs {
    pub long_put_strike: Money,
    pub long_put_premium: Money,
    pub short_put_strike: Money,
    pub short_put_premium: Money,
    pub short_call_strike: Money,
    pub short_call_premium: Money,
    pub long_call_strike: Money,
    pub long_call_premium: Money,
}

impl IronCondorLegs {
    pub fn net_credit(&self) -> Money {
        (self.short_put_premium + self.short_call_premium)
            - (self.long_put_premium + self.long_call_premium)
    }

    /// Wider of the two spreads, which bounds the loss.
    pub fn max_spread_width(&self) -> Money {
        let put_width = self.short_put_strike - self.long_put_strike;
        let call_width = self.long_call_strike - self.short_call_strike;
        put_width.max(call_width)
    }
}

/// Call butterfly: long lower wing, short 2x center, long upper wing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButterflyLegs {
    pub lower_strike: Money,
    pub lower_premium: Money,
    pub center_strike: Money,
    pub center_premium: Money,
    pub upper_strike: Money,
    pub upper_premium: Money,
}

impl ButterflyLegs {
    pub fn net_debit(&self) -> Money {
        self.lower_premium + self.upper_premium - dec!(2) * self.center_premium
    }
}

/// Diagonal calendar: short near-term call + long far-term call at a
/// different strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarLegs {
    pub short_strike: Money,
    pub short_premium: Money,
    pub short_expiration: NaiveDate,
    pub long_strike: Money,
    pub long_premium: Money,
    pub long_expiration: NaiveDate,
}

impl CalendarLegs {
    pub fn net_debit(&self) -> Money {
        self.long_premium - self.short_premium
    }

    pub fn strike_spread(&self) -> Money {
        (self.long_strike - self.short_strike).abs()
    }

    pub fn average_strike(&self) -> Money {
        (self.short_strike + self.long_strike) / dec!(2)
    }
}

/// Closed union over the per-strategy leg shapes, echoed in every result
/// so the P&L curve can be sampled without re-selecting strikes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PositionLegs {
    Strangle(StrangleLegs),
    IronCondor(IronCondorLegs),
    Butterfly(ButterflyLegs),
    Calendar(CalendarLegs),
}

// ---------------------------------------------------------------------------
// Result and metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: StrategyKind,
    pub symbol: String,
    pub legs: PositionLegs,
    pub lower_breakeven: Money,
    pub upper_breakeven: Money,
    pub max_loss: MaxLoss,
    /// Absent means unlimited upside.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_profit: Option<Money>,
    pub net_premium: NetPremium,
    pub profit_zone: ProfitZone,
    pub risk_profile: RiskProfile,
    pub underlying_price: Money,
    pub implied_volatility: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_percentile: Option<Decimal>,
    pub days_to_expiry: u32,
    pub expiration: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalRequirement {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalBias {
    Neutral,
    Volatile,
}

/// Static per-strategy tuning metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub optimal_dte_min: u32,
    pub optimal_dte_max: u32,
    pub risk_level: RiskProfile,
    pub complexity: Complexity,
    pub capital_requirement: CapitalRequirement,
    pub directional_bias: DirectionalBias,
}

/// Static human-readable trading rules. No computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDescription {
    pub name: String,
    pub summary: String,
    pub entry_rules: Vec<String>,
    pub exit_rules: Vec<String>,
    pub risk_management: Vec<String>,
}

// ---------------------------------------------------------------------------
// Shared leg quoting
// ---------------------------------------------------------------------------

/// Premium for a selected leg, or `InsufficientMarketData` when the chain
/// has no usable quote at that strike.
pub(crate) fn leg_premium(
    inputs: &StrategyInputs,
    chain: &crate::chain::OptionChain,
    kind: crate::chain::OptionKind,
    expiration: NaiveDate,
    strike: Money,
) -> EngineResult<Money> {
    chain
        .contract_at(kind, expiration, strike)
        .and_then(crate::strikes::mid_premium)
        .ok_or_else(|| StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("no usable quote for {kind:?} at strike {strike} ({expiration})"),
        })
}

// ---------------------------------------------------------------------------
// Post-calculation invariants
// ---------------------------------------------------------------------------

/// Sanity checks applied after every calculation. A failure here is a
/// defect in strategy logic, not a market condition, and fails loudly.
pub fn check_result_invariants(result: &StrategyResult) -> EngineResult<()> {
    if result.lower_breakeven >= result.upper_breakeven {
        return Err(StrategyEngineError::InvariantViolation {
            strategy: result.strategy.identifier().into(),
            symbol: result.symbol.clone(),
            reason: format!(
                "lower breakeven {} is not below upper breakeven {}",
                result.lower_breakeven, result.upper_breakeven
            ),
        });
    }
    if let MaxLoss::Finite(amount) = result.max_loss {
        if amount <= Decimal::ZERO {
            return Err(StrategyEngineError::InvariantViolation {
                strategy: result.strategy.identifier().into(),
                symbol: result.symbol.clone(),
                reason: format!("finite max loss {amount} is not positive"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result_with(lower: Money, upper: Money, max_loss: MaxLoss) -> StrategyResult {
        StrategyResult {
            strategy: StrategyKind::LongStrangle,
            symbol: "XYZ".into(),
            legs: PositionLegs::Strangle(StrangleLegs {
                put_strike: dec!(95),
                put_premium: dec!(2),
                call_strike: dec!(105),
                call_premium: dec!(2),
            }),
            lower_breakeven: lower,
            upper_breakeven: upper,
            max_loss,
            max_profit: None,
            net_premium: NetPremium::Debit(dec!(4)),
            profit_zone: ProfitZone {
                lower,
                upper,
                kind: crate::types::ProfitZoneKind::Outside,
            },
            risk_profile: RiskProfile::Medium,
            underlying_price: dec!(100),
            implied_volatility: dec!(0.30),
            iv_percentile: None,
            days_to_expiry: 20,
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        }
    }

    #[test]
    fn test_identifier_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::from_identifier(kind.identifier()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        let err = StrategyKind::from_identifier("covered_call").unwrap_err();
        assert!(matches!(
            err,
            StrategyEngineError::StrategyNotImplemented { .. }
        ));
    }

    #[test]
    fn test_invariant_breakeven_ordering() {
        let ok = result_with(dec!(91), dec!(109), MaxLoss::Finite(dec!(400)));
        assert!(check_result_invariants(&ok).is_ok());

        let bad = result_with(dec!(109), dec!(91), MaxLoss::Finite(dec!(400)));
        assert!(matches!(
            check_result_invariants(&bad).unwrap_err(),
            StrategyEngineError::InvariantViolation { .. }
        ));
    }

    #[test]
    fn test_invariant_max_loss_positive_or_unlimited() {
        let bad = result_with(dec!(91), dec!(109), MaxLoss::Finite(dec!(0)));
        assert!(check_result_invariants(&bad).is_err());

        let unlimited = result_with(dec!(91), dec!(109), MaxLoss::Unlimited);
        assert!(check_result_invariants(&unlimited).is_ok());
    }

    #[test]
    fn test_validate_inputs() {
        let mut inputs = StrategyInputs {
            strategy: StrategyKind::LongStrangle,
            symbol: "XYZ".into(),
            current_price: dec!(100),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            days_to_expiry: 20,
            implied_volatility: None,
            iv_percentile: None,
        };
        assert!(validate_inputs(&inputs).is_ok());

        inputs.symbol = "  ".into();
        assert!(validate_inputs(&inputs).is_err());

        inputs.symbol = "XYZ".into();
        inputs.current_price = Decimal::ZERO;
        assert!(validate_inputs(&inputs).is_err());
    }

    #[test]
    fn test_resolve_iv_flags_default() {
        let inputs = StrategyInputs {
            strategy: StrategyKind::LongStrangle,
            symbol: "XYZ".into(),
            current_price: dec!(100),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            days_to_expiry: 20,
            implied_volatility: None,
            iv_percentile: None,
        };
        assert_eq!(inputs.resolve_iv(), (DEFAULT_IV, true));
    }
}
