//! Strategy dispatch. The registry is the closed `StrategyKind` enum:
//! every capability is an exhaustive match, so adding a strategy without
//! wiring all of its operations fails to compile.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::chain::OptionChain;
use crate::error::StrategyEngineError;
use crate::strategies::{
    butterfly, calendar, iron_condor, long_strangle, short_strangle, PositionLegs,
    StrategyDescription, StrategyInputs, StrategyKind, StrategyParameters, StrategyResult,
};
use crate::types::{with_metadata, ComputationOutput, Money, PLPoint, RiskProfile};
use crate::EngineResult;

/// Default sample count for the P&L curve.
pub const DEFAULT_PL_SAMPLES: u32 = 100;

/// P&L curve price band around the underlying: 70% to 130%.
const PL_RANGE_LOW: Decimal = dec!(0.70);
const PL_RANGE_HIGH: Decimal = dec!(1.30);

/// Catalogue entry for one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub kind: StrategyKind,
    pub identifier: String,
    pub name: String,
    pub parameters: StrategyParameters,
    pub description: StrategyDescription,
}

/// Position-sizing advice as a slice of portfolio value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSizeAdvice {
    pub strategy: StrategyKind,
    pub risk_profile: RiskProfile,
    pub max_size: Money,
    pub recommended_size: Money,
    pub reasoning: String,
}

/// Full calculation for one strategy against a quoted chain, wrapped in
/// the standard envelope. Soft conditions (defaulted IV, approximate
/// models) surface as warnings, never as silent adjustments.
pub fn calculate(
    inputs: &StrategyInputs,
    chain: &OptionChain,
) -> EngineResult<ComputationOutput<StrategyResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if inputs.implied_volatility.is_none() {
        warnings.push(format!(
            "implied volatility not supplied; defaulted to {}",
            crate::strategies::DEFAULT_IV
        ));
    }
    if inputs.strategy == StrategyKind::DiagonalCalendar {
        warnings.push(
            "diagonal calendar breakevens and P&L are estimates; the short leg's \
             remaining time value is not modeled"
                .into(),
        );
    }

    let result = match inputs.strategy {
        StrategyKind::LongStrangle => long_strangle::calculate(inputs, chain),
        StrategyKind::ShortStrangle => short_strangle::calculate(inputs, chain),
        StrategyKind::IronCondor => iron_condor::calculate(inputs, chain),
        StrategyKind::ButterflySpread => butterfly::calculate(inputs, chain),
        StrategyKind::DiagonalCalendar => calendar::calculate(inputs, chain),
    }?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} — expiry position analysis", inputs.strategy.name()),
        &serde_json::json!({
            "strategy": inputs.strategy.identifier(),
            "symbol": inputs.symbol,
            "current_price": inputs.current_price.to_string(),
            "expiration": inputs.expiration.to_string(),
            "days_to_expiry": inputs.days_to_expiry,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Static catalogue of every supported strategy.
pub fn available_strategies() -> Vec<StrategyInfo> {
    StrategyKind::ALL
        .into_iter()
        .map(|kind| StrategyInfo {
            kind,
            identifier: kind.identifier().into(),
            name: kind.name().into(),
            parameters: parameters(kind),
            description: description(kind),
        })
        .collect()
}

pub fn parameters(kind: StrategyKind) -> StrategyParameters {
    match kind {
        StrategyKind::LongStrangle => long_strangle::parameters(),
        StrategyKind::ShortStrangle => short_strangle::parameters(),
        StrategyKind::IronCondor => iron_condor::parameters(),
        StrategyKind::ButterflySpread => butterfly::parameters(),
        StrategyKind::DiagonalCalendar => calendar::parameters(),
    }
}

pub fn description(kind: StrategyKind) -> StrategyDescription {
    match kind {
        StrategyKind::LongStrangle => long_strangle::description(),
        StrategyKind::ShortStrangle => short_strangle::description(),
        StrategyKind::IronCondor => iron_condor::description(),
        StrategyKind::ButterflySpread => butterfly::description(),
        StrategyKind::DiagonalCalendar => calendar::description(),
    }
}

/// Expiry P&L for one hypothetical price, dispatched on the legs echoed
/// in the result.
pub fn profit_loss_at_price(result: &StrategyResult, price: Money) -> EngineResult<Money> {
    match (result.strategy, &result.legs) {
        (StrategyKind::LongStrangle, PositionLegs::Strangle(legs)) => {
            Ok(long_strangle::profit_loss_at_price(legs, price))
        }
        (StrategyKind::ShortStrangle, PositionLegs::Strangle(legs)) => {
            Ok(short_strangle::profit_loss_at_price(legs, price))
        }
        (StrategyKind::IronCondor, PositionLegs::IronCondor(legs)) => {
            Ok(iron_condor::profit_loss_at_price(legs, price))
        }
        (StrategyKind::ButterflySpread, PositionLegs::Butterfly(legs)) => {
            Ok(butterfly::profit_loss_at_price(legs, price))
        }
        (StrategyKind::DiagonalCalendar, PositionLegs::Calendar(legs)) => {
            Ok(calendar::profit_loss_at_price(legs, price))
        }
        (strategy, _) => Err(StrategyEngineError::InvariantViolation {
            strategy: strategy.identifier().into(),
            symbol: result.symbol.clone(),
            reason: "result legs do not match the strategy kind".into(),
        }),
    }
}

/// Uniform expiry P&L grid over 70%-130% of the underlying price.
pub fn calculate_pl_curve(
    result: &StrategyResult,
    samples: Option<u32>,
) -> EngineResult<Vec<PLPoint>> {
    let samples = samples.unwrap_or(DEFAULT_PL_SAMPLES);
    if samples < 2 {
        return Err(StrategyEngineError::InvalidInput {
            field: "samples".into(),
            reason: "P&L curve needs at least 2 samples".into(),
        });
    }

    let low = result.underlying_price * PL_RANGE_LOW;
    let high = result.underlying_price * PL_RANGE_HIGH;
    let step = (high - low) / Decimal::from(samples - 1);

    let mut curve = Vec::with_capacity(samples as usize);
    for i in 0..samples {
        let price = (low + step * Decimal::from(i)).round_dp(4);
        curve.push(PLPoint {
            price,
            profit_loss: profit_loss_at_price(result, price)?.round_dp(2),
        });
    }
    Ok(curve)
}

/// Percentage-of-portfolio sizing per risk tier.
pub fn recommended_position_size(
    kind: StrategyKind,
    portfolio_value: Money,
) -> EngineResult<PositionSizeAdvice> {
    if portfolio_value <= Decimal::ZERO {
        return Err(StrategyEngineError::InvalidInput {
            field: "portfolio_value".into(),
            reason: "must be positive".into(),
        });
    }

    let risk_profile = parameters(kind).risk_level;
    let (low_pct, high_pct, reasoning) = match risk_profile {
        RiskProfile::Low => (
            dec!(0.05),
            dec!(0.10),
            "Defined, small max loss allows a 5-10% allocation",
        ),
        RiskProfile::Medium => (
            dec!(0.02),
            dec!(0.05),
            "Defined but meaningful max loss; keep to 2-5% of the portfolio",
        ),
        RiskProfile::High => (
            dec!(0.01),
            dec!(0.03),
            "Large potential drawdown; limit to 1-3% of the portfolio",
        ),
        RiskProfile::Unlimited => (
            dec!(0.005),
            dec!(0.02),
            "Unlimited loss potential; cap exposure at 0.5-2% of the portfolio",
        ),
    };

    Ok(PositionSizeAdvice {
        strategy: kind,
        risk_profile,
        max_size: (portfolio_value * high_pct).round_dp(2),
        recommended_size: (portfolio_value * (low_pct + high_pct) / dec!(2)).round_dp(2),
        reasoning: reasoning.into(),
    })
}
