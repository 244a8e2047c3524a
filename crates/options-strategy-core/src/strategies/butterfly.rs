//! Call butterfly: long lower wing, short 2x center, long upper wing on
//! one expiration. Cheap debit structure with peak profit at the center
//! strike.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::chain::{OptionChain, OptionKind};
use crate::error::StrategyEngineError;
use crate::strikes::{select_strike, target_distance, DistanceClass, SearchDirection};
use crate::types::{MaxLoss, Money, NetPremium, ProfitZone, ProfitZoneKind, RiskProfile};
use crate::EngineResult;

use super::{
    check_result_invariants, leg_premium, validate_inputs, ButterflyLegs, CapitalRequirement,
    Complexity, DirectionalBias, PositionLegs, StrategyDescription, StrategyInputs,
    StrategyParameters, StrategyResult, CONTRACT_MULTIPLIER,
};

const MIN_CALL_STRIKES: usize = 6;

pub fn find_optimal_strikes(
    inputs: &StrategyInputs,
    chain: &OptionChain,
) -> EngineResult<ButterflyLegs> {
    let calls = chain.strikes(OptionKind::Call, inputs.expiration);
    if calls.len() < MIN_CALL_STRIKES {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "butterfly needs at least {MIN_CALL_STRIKES} call strikes on {} (found {})",
                inputs.expiration,
                calls.len()
            ),
        });
    }

    // Center sits at the money; wings one debit-tier distance out.
    let center_strike = select_strike(&calls, inputs.current_price, SearchDirection::Nearest)
        .unwrap_or(calls[0]);
    let wing_distance =
        target_distance(inputs.current_price, DistanceClass::Debit, inputs.days_to_expiry);

    let lower_candidates: Vec<Money> =
        calls.iter().copied().filter(|s| *s < center_strike).collect();
    let upper_candidates: Vec<Money> =
        calls.iter().copied().filter(|s| *s > center_strike).collect();
    if lower_candidates.is_empty() || upper_candidates.is_empty() {
        return Err(StrategyEngineError::InsufficientMarketData {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("no strikes quoted on both sides of center {center_strike}"),
        });
    }

    let lower_strike = select_strike(
        &lower_candidates,
        center_strike - wing_distance,
        SearchDirection::Below,
    )
    .unwrap_or(lower_candidates[0]);
    let upper_strike = select_strike(
        &upper_candidates,
        center_strike + wing_distance,
        SearchDirection::Above,
    )
    .unwrap_or(upper_candidates[upper_candidates.len() - 1]);

    let exp = inputs.expiration;
    Ok(ButterflyLegs {
        lower_strike,
        lower_premium: leg_premium(inputs, chain, OptionKind::Call, exp, lower_strike)?,
        center_strike,
        center_premium: leg_premium(inputs, chain, OptionKind::Call, exp, center_strike)?,
        upper_strike,
        upper_premium: leg_premium(inputs, chain, OptionKind::Call, exp, upper_strike)?,
    })
}

pub fn calculate_position(
    inputs: &StrategyInputs,
    legs: &ButterflyLegs,
) -> EngineResult<StrategyResult> {
    let net_debit = legs.net_debit();
    if net_debit <= Decimal::ZERO {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!("net debit {net_debit} is not positive"),
        });
    }

    // The debit must leave room for profit inside the narrower wing.
    let lower_wing = legs.center_strike - legs.lower_strike;
    let upper_wing = legs.upper_strike - legs.center_strike;
    if net_debit >= lower_wing.min(upper_wing) {
        return Err(StrategyEngineError::UnprofitableStructure {
            strategy: inputs.strategy.identifier().into(),
            symbol: inputs.symbol.clone(),
            reason: format!(
                "net debit {net_debit} consumes the wing width ({lower_wing}/{upper_wing})"
            ),
        });
    }

    let lower_breakeven = legs.lower_strike + net_debit;
    let upper_breakeven = legs.upper_strike - net_debit;
    let (implied_volatility, _) = inputs.resolve_iv();

    Ok(StrategyResult {
        strategy: inputs.strategy,
        symbol: inputs.symbol.clone(),
        legs: PositionLegs::Butterfly(*legs),
        lower_breakeven,
        upper_breakeven,
        max_loss: MaxLoss::Finite((net_debit * CONTRACT_MULTIPLIER).round_dp(2)),
        // Realized exactly at the center strike.
        max_profit: Some(((lower_wing - net_debit) * CONTRACT_MULTIPLIER).round_dp(2)),
        net_premium: NetPremium::Debit(net_debit),
        profit_zone: ProfitZone {
            lower: lower_breakeven,
            upper: upper_breakeven,
            kind: ProfitZoneKind::Between,
        },
        risk_profile: RiskProfile::Low,
        underlying_price: inputs.current_price,
        implied_volatility,
        iv_percentile: inputs.iv_percentile,
        days_to_expiry: inputs.days_to_expiry,
        expiration: inputs.expiration,
    })
}

/// Expiry P&L per contract: one long call at each wing against two short
/// calls at the center, net of the debit paid.
pub fn profit_loss_at_price(legs: &ButterflyLegs, price: Money) -> Money {
    let lower = (price - legs.lower_strike).max(Decimal::ZERO);
    let center = (price - legs.center_strike).max(Decimal::ZERO);
    let upper = (price - legs.upper_strike).max(Decimal::ZERO);
    (lower - dec!(2) * center + upper - legs.net_debit()) * CONTRACT_MULTIPLIER
}

pub fn parameters() -> StrategyParameters {
    StrategyParameters {
        optimal_dte_min: 20,
        optimal_dte_max: 40,
        risk_level: RiskProfile::Low,
        complexity: Complexity::Intermediate,
        capital_requirement: CapitalRequirement::Low,
        directional_bias: DirectionalBias::Neutral,
    }
}

pub fn description() -> StrategyDescription {
    StrategyDescription {
        name: "Butterfly Spread".into(),
        summary: "Buy a lower and upper call wing against two short calls at the \
                  center strike. Small debit, peak profit if the underlying pins \
                  the center at expiration."
            .into(),
        entry_rules: vec![
            "Enter when the underlying is expected to stay near the center strike".into(),
            "Favor 20-40 days to expiry".into(),
            "Center the body at the money and keep the wings symmetric".into(),
        ],
        exit_rules: vec![
            "Take profit as the underlying approaches the center near expiration".into(),
            "Close early if the underlying trends strongly through a wing".into(),
        ],
        risk_management: vec![
            "Max loss is the debit paid; no margin call risk".into(),
            "Commissions matter across three legs; avoid overtrading small spreads".into(),
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
