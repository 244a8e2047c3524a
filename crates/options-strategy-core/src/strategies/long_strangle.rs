//! Long strangle: buy an OTM put and an OTM call on the same expiration.
//! Debit structure profiting from a large move in either direction.

use rust_decimal::Decimal;

use crate::chain::{OptionChain, OptionKind};
use crate::error::StrategyEngineError;
use crate::strikes::{select_strike, target_distance, DistanceClass, SearchDirection};
use crate::types::{MaxLoss, Money, NetPremium, ProfitZone, ProfitZoneKind, RiskProfile};
use crate::EngineResult;

use super::{
    check_result_invariants, leg_premium, validate_inputs, CapitalRequirement, Complexity,
    DirectionalBias, PositionLegs, StrangleLegs, StrategyDescription, StrategyInputs,
    StrategyParameters, StrategyResult, CONTRACT_MULTIPLIER,
};

pub fn find_optimal_strikes(
    inputs: &StrategyInputs,
    chain: &OptionChain,
) -> EngineResult<StrangleLegs> {
    let puts = chain.strikes(OptionKind::Put, inputs.expiration);
    let calls = chain.strikes(OptionKind::Call, inputs.expiration);
    if puts.is_empty() || calls.is_empty() {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "strangle needs at least one put and one call on {} (found {} puts, {} calls)",
                inputs.expiration,
                puts.len(),
                calls.len()
            ),
        });
    }

    let distance = target_distance(inputs.current_price, DistanceClass::Debit, inputs.days_to_expiry);
    let put_target = inputs.current_price - distance;
    let call_target = inputs.current_price + distance;

    // Non-empty lists, so the scans always resolve.
    let put_strike = select_strike(&puts, put_target, SearchDirection::Below)
        .unwrap_or(puts[0]);
    let call_strike = select_strike(&calls, call_target, SearchDirection::Above)
        .unwrap_or(calls[calls.len() - 1]);

    Ok(StrangleLegs {
        put_strike,
        put_premium: leg_premium(inputs, chain, OptionKind::Put, inputs.expiration, put_strike)?,
        call_strike,
        call_premium: leg_premium(inputs, chain, OptionKind::Call, inputs.expiration, call_strike)?,
    })
}

pub fn calculate_position(
    inputs: &StrategyInputs,
    legs: &StrangleLegs,
) -> EngineResult<StrategyResult> {
    let total_premium = legs.total_premium();
    if total_premium <= Decimal::ZERO {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("net debit {total_premium} is not positive"),
        });
    }

    let lower_breakeven = legs.put_strike - total_premium;
    let upper_breakeven = legs.call_strike + total_premium;
    let (implied_volatility, _) = inputs.resolve_iv();

    Ok(StrategyResult {
        strategy: inputs.strategy,
        symbol: inputs.symbol.clone(),
        legs: PositionLegs::Strangle(*legs),
        lower_breakeven,
        upper_breakeven,
        max_loss: MaxLoss::Finite((total_premium * CONTRACT_MULTIPLIER).round_dp(2)),
        max_profit: None,
        net_premium: NetPremium::Debit(total_premium),
        profit_zone: ProfitZone {
            lower: lower_breakeven,
            upper: upper_breakeven,
            kind: ProfitZoneKind::Outside,
        },
        risk_profile: RiskProfile::Medium,
        underlying_price: inputs.current_price,
        implied_volatility,
        iv_percentile: inputs.iv_percentile,
        days_to_expiry: inputs.days_to_expiry,
        expiration: inputs.expiration,
    })
}

/// Expiry P&L per contract: intrinsic value of both long legs net of the
/// premium paid, times the contract multiplier.
pub fn profit_loss_at_price(legs: &StrangleLegs, price: Money) -> Money {
    let put_intrinsic = (legs.put_strike - price).max(Decimal::ZERO);
    let call_intrinsic = (price - legs.call_strike).max(Decimal::ZERO);
    (put_intrinsic + call_intrinsic - legs.total_premium()) * CONTRACT_MULTIPLIER
}

pub fn parameters() -> StrategyParameters {
    StrategyParameters {
        optimal_dte_min: 30,
        optimal_dte_max: 60,
        risk_level: RiskProfile::Medium,
        complexity: Complexity::Beginner,
        capital_requirement: CapitalRequirement::Low,
        directional_bias: DirectionalBias::Volatile,
    }
}

pub fn description() -> StrategyDescription {
    StrategyDescription {
        name: "Long Strangle".into(),
        summary: "Buy an out-of-the-money put and call on the same expiration. \
                  Profits from a large move in either direction; risk is capped \
                  at the premium paid."
            .into(),
        entry_rules: vec![
            "Enter when implied volatility is low relative to its historical range".into(),
            "Favor 30-60 days to expiry to balance premium cost against time decay".into(),
            "Size both legs out-of-the-money at comparable deltas".into(),
        ],
        exit_rules: vec![
            "Take profit on a breakout beyond either breakeven".into(),
            "Close or roll at 50% of max loss, or with 7 days to expiry".into(),
        ],
        risk_management: vec![
            "Max loss is the total premium paid; never add to a losing position".into(),
            "Avoid holding through the final week when theta decay accelerates".into(),
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
