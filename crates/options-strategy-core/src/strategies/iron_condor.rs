//! Iron condor: short put spread plus short call spread on one
//! expiration. Defined-risk credit structure profiting when the
//! underlying stays between the short strikes.

use rust_decimal::Decimal;

use crate::chain::{OptionChain, OptionKind};
use crate::error::StrategyEngineError;
use crate::strikes::{select_strike, target_distance, DistanceClass, SearchDirection};
use crate::types::{MaxLoss, Money, NetPremium, ProfitZone, ProfitZoneKind, RiskProfile};
use crate::EngineResult;

use super::{
    check_result_invariants, leg_premium, validate_inputs, CapitalRequirement, Complexity,
    DirectionalBias, IronCondorLegs, PositionLegs, StrategyDescription, StrategyInputs,
    StrategyParameters, StrategyResult, CONTRACT_MULTIPLIER,
};

const MIN_STRIKES_PER_SIDE: usize = 4;

pub fn find_optimal_strikes(
    inputs: &StrategyInputs,
    chain: &OptionChain,
) -> EngineResult<IronCondorLegs> {
    let puts = chain.strikes(OptionKind::Put, inputs.expiration);
    let calls = chain.strikes(OptionKind::Call, inputs.expiration);
    if puts.len() < MIN_STRIKES_PER_SIDE || calls.len() < MIN_STRIKES_PER_SIDE {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "iron condor needs at least {MIN_STRIKES_PER_SIDE} put and {MIN_STRIKES_PER_SIDE} \
                 call strikes on {} (found {} puts, {} calls)",
                inputs.expiration,
                puts.len(),
                calls.len()
            ),
        });
    }

    let short_distance =
        target_distance(inputs.current_price, DistanceClass::Credit, inputs.days_to_expiry);
    let wing_offset =
        target_distance(inputs.current_price, DistanceClass::WingOffset, inputs.days_to_expiry);

    let short_put_strike = select_strike(
        &puts,
        inputs.current_price - short_distance,
        SearchDirection::Below,
    )
    .unwrap_or(puts[0]);
    let short_call_strike = select_strike(
        &calls,
        inputs.current_price + short_distance,
        SearchDirection::Above,
    )
    .unwrap_or(calls[calls.len() - 1]);

    // Protective wings must land strictly beyond their short strike.
    let outer_puts: Vec<Money> = puts.iter().copied().filter(|s| *s < short_put_strike).collect();
    let outer_calls: Vec<Money> =
        calls.iter().copied().filter(|s| *s > short_call_strike).collect();
    if outer_puts.is_empty() || outer_calls.is_empty() {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "no strikes remain beyond short strikes {short_put_strike}/{short_call_strike} \
                 for the protective wings"
            ),
        });
    }

    let long_put_strike = select_strike(
        &outer_puts,
        short_put_strike - wing_offset,
        SearchDirection::Below,
    )
    .unwrap_or(outer_puts[0]);
    let long_call_strike = select_strike(
        &outer_calls,
        short_call_strike + wing_offset,
        SearchDirection::Above,
    )
    .unwrap_or(outer_calls[outer_calls.len() - 1]);

    let exp = inputs.expiration;
    Ok(IronCondorLegs {
        long_put_strike,
        long_put_premium: leg_premium(inputs, chain, OptionKind::Put, exp, long_put_strike)?,
        short_put_strike,
        short_put_premium: leg_premium(inputs, chain, OptionKind::Put, exp, short_put_strike)?,
        short_call_strike,
        short_call_premium: leg_premium(inputs, chain, OptionKind::Call, exp, short_call_strike)?,
        long_call_strike,
        long_call_premium: leg_premium(inputs, chain, OptionKind::Call, exp, long_call_strike)?,
    })
}

pub fn calculate_position(
    inputs: &StrategyInputs,
    legs: &IronCondorLegs,
) -> EngineResult<StrategyResult> {
    // Each spread must be a credit on its own, not just the combination.
    if legs.short_put_premium <= legs.long_put_premium {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "put spread is not a credit (short {} <= long {})",
                legs.short_put_premium, legs.long_put_premium
            ),
        });
    }
    if legs.short_call_premium <= legs.long_call_premium {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "call spread is not a credit (short {} <= long {})",
                legs.short_call_premium, legs.long_call_premium
            ),
        });
    }
    let net_credit = legs.net_credit();
    if net_credit <= Decimal::ZERO {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "net credit {net_credit} is not positive (short legs must out-earn the wings)"
            ),
        });
    }

    let lower_breakeven = legs.short_put_strike - net_credit;
    let upper_breakeven = legs.short_call_strike + net_credit;
    let max_loss = (legs.max_spread_width() - net_credit) * CONTRACT_MULTIPLIER;
    let (implied_volatility, _) = inputs.resolve_iv();

    Ok(StrategyResult {
        strategy: inputs.strategy,
        symbol: inputs.symbol.clone(),
        legs: PositionLegs::IronCondor(*legs),
        lower_breakeven,
        upper_breakeven,
        max_loss: MaxLoss::Finite(max_loss.round_dp(2)),
        max_profit: Some((net_credit * CONTRACT_MULTIPLIER).round_dp(2)),
        net_premium: NetPremium::Credit(net_credit),
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

/// Expiry P&L per contract across all four legs.
pub fn profit_loss_at_price(legs: &IronCondorLegs, price: Money) -> Money {
    let short_put = (legs.short_put_strike - price).max(Decimal::ZERO);
    let short_call = (price - legs.short_call_strike).max(Decimal::ZERO);
    let long_put = (legs.long_put_strike - price).max(Decimal::ZERO);
    let long_call = (price - legs.long_call_strike).max(Decimal::ZERO);
    (legs.net_credit() - short_put - short_call + long_put + long_call) * CONTRACT_MULTIPLIER
}

pub fn parameters() -> StrategyParameters {
    StrategyParameters {
        optimal_dte_min: 30,
        optimal_dte_max: 45,
        risk_level: RiskProfile::Medium,
        complexity: Complexity::Intermediate,
        capital_requirement: CapitalRequirement::Medium,
        directional_bias: DirectionalBias::Neutral,
    }
}

pub fn description() -> StrategyDescription {
    StrategyDescription {
        name: "Iron Condor".into(),
        summary: "Sell a put spread and a call spread around the current price. \
                  Collects a net credit with loss capped by the protective wings."
            .into(),
        entry_rules: vec![
            "Enter when implied volatility is elevated and the underlying is range-bound".into(),
            "Favor 30-45 days to expiry".into(),
            "Keep both spreads symmetric around the current price".into(),
        ],
        exit_rules: vec![
            "Take profit at 50% of the credit received".into(),
            "Close the threatened spread when the underlying tests a short strike".into(),
        ],
        risk_management: vec![
            "Max loss is the wider spread width minus the credit".into(),
            "Never let the wings be wider than the account can absorb".into(),
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
