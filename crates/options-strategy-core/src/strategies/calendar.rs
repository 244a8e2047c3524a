//! Diagonal calendar: sell a near-term call, buy a longer-dated call at a
//! different strike. The numbers here are documented approximations: the
//! true value at the near expiration depends on the long leg's remaining
//! time value, which this engine does not model.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::chain::{OptionChain, OptionKind};
use crate::error::StrategyEngineError;
use crate::strikes::{select_strike, target_distance, DistanceClass, SearchDirection};
use crate::types::{MaxLoss, Money, NetPremium, ProfitZone, ProfitZoneKind, RiskProfile};
use crate::EngineResult;

use super::{
    check_result_invariants, leg_premium, validate_inputs, CalendarLegs, CapitalRequirement,
    Complexity, DirectionalBias, PositionLegs, StrategyDescription, StrategyInputs,
    StrategyParameters, StrategyResult, CONTRACT_MULTIPLIER,
};

pub fn find_optimal_strikes(
    inputs: &StrategyInputs,
    chain: &OptionChain,
) -> EngineResult<CalendarLegs> {
    let expirations = chain.expirations();
    if expirations.len() < 2 {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "calendar needs two distinct expirations (found {})",
                expirations.len()
            ),
        });
    }

    let short_expiration = inputs.expiration;
    let long_expiration = chain.next_expiration_after(short_expiration).ok_or_else(|| {
        StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("no expiration quoted after {short_expiration}"),
        }
    })?;

    let near_calls = chain.strikes(OptionKind::Call, short_expiration);
    if near_calls.is_empty() {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("no calls quoted on {short_expiration}"),
        });
    }

    let distance =
        target_distance(inputs.current_price, DistanceClass::Debit, inputs.days_to_expiry);
    let short_strike = select_strike(
        &near_calls,
        inputs.current_price + distance,
        SearchDirection::Above,
    )
    .unwrap_or(near_calls[near_calls.len() - 1]);

    // Long leg sits closer to the money on the far expiration; a diagonal
    // needs a distinct strike, so the short strike itself is excluded.
    let far_calls: Vec<Money> = chain
        .strikes(OptionKind::Call, long_expiration)
        .into_iter()
        .filter(|s| *s != short_strike)
        .collect();
    if far_calls.is_empty() {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("no distinct call strike quoted on {long_expiration}"),
        });
    }
    let long_strike = select_strike(
        &far_calls,
        inputs.current_price + distance / dec!(2),
        SearchDirection::Above,
    )
    .unwrap_or(far_calls[far_calls.len() - 1]);

    Ok(CalendarLegs {
        short_strike,
        short_premium: leg_premium(inputs, chain, OptionKind::Call, short_expiration, short_strike)?,
        short_expiration,
        long_strike,
        long_premium: leg_premium(inputs, chain, OptionKind::Call, long_expiration, long_strike)?,
        long_expiration,
    })
}

pub fn calculate_position(
    inputs: &StrategyInputs,
    legs: &CalendarLegs,
) -> EngineResult<StrategyResult> {
    let net_debit = legs.net_debit();
    if net_debit <= Decimal::ZERO {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "long leg premium {} must exceed short leg premium {}",
                legs.long_premium, legs.short_premium
            ),
        });
    }

    // Approximation: breakevens straddle the average strike at twice the
    // debit; max profit assumes the short leg expires worthless with the
    // underlying near the strike spread.
    let average_strike = legs.average_strike();
    let lower_breakeven = average_strike - dec!(2) * net_debit;
    let upper_breakeven = average_strike + dec!(2) * net_debit;
    let max_profit =
        (legs.short_premium + dec!(0.5) * legs.strike_spread()) * CONTRACT_MULTIPLIER;
    let (implied_volatility, _) = inputs.resolve_iv();

    Ok(StrategyResult {
        strategy: inputs.strategy,
        symbol: inputs.symbol.clone(),
        legs: PositionLegs::Calendar(*legs),
        lower_breakeven,
        upper_breakeven,
        max_loss: MaxLoss::Finite((net_debit * CONTRACT_MULTIPLIER).round_dp(2)),
        max_profit: Some(max_profit.round_dp(2)),
        net_premium: NetPremium::Debit(net_debit),
        profit_zone: ProfitZone {
            lower: lower_breakeven,
            upper: upper_breakeven,
            kind: ProfitZoneKind::Between,
        },
        risk_profile: RiskProfile::Medium,
        underlying_price: inputs.current_price,
        implied_volatility,
        iv_percentile: inputs.iv_percentile,
        days_to_expiry: inputs.days_to_expiry,
        expiration: inputs.expiration,
    })
}

/// Simplified P&L proxy: peak profit at the average strike decaying
/// linearly to zero at the breakevens, then toward max loss away from the
/// zone. Not an expiry identity like the other strategies; the short
/// leg's remaining time value at the long leg's horizon is not modeled.
pub fn profit_loss_at_price(legs: &CalendarLegs, price: Money) -> Money {
    let net_debit = legs.net_debit();
    let half_width = dec!(2) * net_debit;
    if half_width <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let max_profit = (legs.short_premium + dec!(0.5) * legs.strike_spread()) * CONTRACT_MULTIPLIER;
    let max_loss = net_debit * CONTRACT_MULTIPLIER;
    let distance = (price - legs.average_strike()).abs();

    if distance <= half_width {
        max_profit * (Decimal::ONE - distance / half_width)
    } else {
        let overshoot = (distance - half_width) / half_width;
        -(max_loss * overshoot).min(max_loss)
    }
}

pub fn parameters() -> StrategyParameters {
    StrategyParameters {
        optimal_dte_min: 25,
        optimal_dte_max: 50,
        risk_level: RiskProfile::Medium,
        complexity: Complexity::Advanced,
        capital_requirement: CapitalRequirement::Medium,
        directional_bias: DirectionalBias::Neutral,
    }
}

pub fn description() -> StrategyDescription {
    StrategyDescription {
        name: "Diagonal Calendar Spread".into(),
        summary: "Sell a near-term call and buy a longer-dated call at a \
                  different strike. Harvests the near leg's faster time decay; \
                  risk is capped at the net debit."
            .into(),
        entry_rules: vec![
            "Enter when near-term implied volatility is rich versus the back month".into(),
            "Sell the front month slightly out-of-the-money".into(),
            "Buy the back month closer to the money for a manageable debit".into(),
        ],
        exit_rules: vec![
            "Close or roll the short leg at front-month expiration".into(),
            "Exit if the underlying moves far beyond either strike".into(),
        ],
        risk_management: vec![
            "Max loss is the net debit paid".into(),
            "Projected breakevens and P&L are estimates; manage by the short strike, \
             not the model"
                .into(),
        ],
    }
}

pub fn calculate(inputs: &StrategyInputs, chain: &OptionChain) -> EngineResult<StrategyResult> {
    validate_inputs(inputs)?;
    let legs = find_optimal_strikes(inputs, chain)?;
    let result = calculate_position(inputs, &legs)?;
    check_result_invariants(&result)?;
    Ok(result)
}
