//! Short strangle: sell an OTM put and an OTM call on the same expiration.
//! Credit structure profiting when the underlying stays between the
//! strikes. Loss is uncapped on both sides.

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

    // Wider strikes than the long strangle: sold premium needs margin for
    // the underlying to wander.
    let distance =
        target_distance(inputs.current_price, DistanceClass::Credit, inputs.days_to_expiry);
    let put_target = inputs.current_price - distance;
    let call_target = inputs.current_price + distance;

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
            reason: format!("net credit {total_premium} is not positive"),
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
        max_loss: MaxLoss::Unlimited,
        max_profit: Some((total_premium * CONTRACT_MULTIPLIER).round_dp(2)),
        net_premium: NetPremium::Credit(total_premium),
        profit_zone: ProfitZone {
            lower: lower_breakeven,
            upper: upper_breakeven,
            kind: ProfitZoneKind::Between,
        },
        risk_profile: RiskProfile::Unlimited,
        underlying_price: inputs.current_price,
        implied_volatility,
        iv_percentile: inputs.iv_percentile,
        days_to_expiry: inputs.days_to_expiry,
        expiration: inputs.expiration,
    })
}

/// Expiry P&L per contract: premium collected less the intrinsic value of
/// the two short legs, times the contract multiplier.
pub fn profit_loss_at_price(legs: &StrangleLegs, price: Money) -> Money {
    let put_intrinsic = (legs.put_strike - price).max(Decimal::ZERO);
    let call_intrinsic = (price - legs.call_strike).max(Decimal::ZERO);
    (legs.total_premium() - put_intrinsic - call_intrinsic) * CONTRACT_MULTIPLIER
}

pub fn parameters() -> StrategyParameters {
    StrategyParameters {
        optimal_dte_min: 20,
        optimal_dte_max: 45,
        risk_level: RiskProfile::Unlimited,
        complexity: Complexity::Advanced,
        capital_requirement: CapitalRequirement::High,
        directional_bias: DirectionalBias::Neutral,
    }
}

pub fn description() -> StrategyDescription {
    StrategyDescription {
        name: "Short Strangle".into(),
        summary: "Sell an out-of-the-money put and call on the same expiration. \
                  Collects premium while the underlying stays in a range. Loss \
                  is unlimited beyond either strike."
            .into(),
        entry_rules: vec![
            "Enter when implied volatility is high relative to its historical range".into(),
            "Favor 20-45 days to expiry for the steepest theta decay".into(),
            "Sell strikes well outside the expected move".into(),
        ],
        exit_rules: vec![
            "Take profit at 50% of the credit received".into(),
            "Close or roll when the underlying approaches either short strike".into(),
        ],
        risk_management: vec![
            "Requires margin; loss is unlimited in both directions".into(),
            "Define an exit price before entry and honor it mechanically".into(),
            "Keep position size small relative to the portfolio".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn inputs() -> StrategyInputs {
        StrategyInputs {
            strategy: StrategyKind::ShortStrangle,
            symbol: "XYZ".into(),
            current_price: dec!(100),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            days_to_expiry: 30,
            implied_volatility: Some(dec!(0.45)),
            iv_percentile: Some(dec!(80)),
        }
    }

    fn legs() -> StrangleLegs {
        StrangleLegs {
            put_strike: dec!(90),
            put_premium: dec!(1.50),
            call_strike: dec!(110),
            call_premium: dec!(1.50),
        }
    }

    #[test]
    fn test_position_math() {
        let result = calculate_position(&inputs(), &legs()).unwrap();
        assert_eq!(result.lower_breakeven, dec!(87));
        assert_eq!(result.upper_breakeven, dec!(113));
        // Loss is the unlimited sentinel, never a finite stand-in.
        assert_eq!(result.max_loss, MaxLoss::Unlimited);
        assert_eq!(result.max_profit, Some(dec!(300.00)));
        assert_eq!(result.net_premium, NetPremium::Credit(dec!(3.00)));
        assert_eq!(result.profit_zone.kind, ProfitZoneKind::Between);
        assert_eq!(result.risk_profile, RiskProfile::Unlimited);
    }

    #[test]
    fn test_pl_zero_at_breakevens() {
        let l = legs();
        assert_eq!(profit_loss_at_price(&l, dec!(87)), dec!(0));
        assert_eq!(profit_loss_at_price(&l, dec!(113)), dec!(0));
    }

    #[test]
    fn test_pl_between_strikes_is_full_credit() {
        let l = legs();
        assert_eq!(profit_loss_at_price(&l, dec!(100)), dec!(300));
    }

    #[test]
    fn test_pl_loss_grows_without_bound() {
        let l = legs();
        assert_eq!(profit_loss_at_price(&l, dec!(130)), dec!(-1700));
        assert_eq!(profit_loss_at_price(&l, dec!(60)), dec!(-2700));
    }

    #[test]
    fn test_selected_strikes_wider_than_long_strangle() {
        // Same chain and DTE: the credit-tier scan must land further from
        // the money than the debit-tier scan.
        use crate::strategies::long_strangle;

        let exp = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let mut contracts = Vec::new();
        for strike in 80..=120 {
            for kind in [OptionKind::Put, OptionKind::Call] {
                contracts.push(crate::chain::OptionContract {
                    symbol: "XYZ".into(),
                    strike: Decimal::from(strike),
                    kind,
                    bid: Some(dec!(1.40)),
                    ask: Some(dec!(1.60)),
                    last: Some(dec!(1.50)),
                    expiration: exp,
                    volume: None,
                    open_interest: None,
                    implied_volatility: None,
                    greeks: None,
                });
            }
        }
        let chain = OptionChain {
            symbol: "XYZ".into(),
            underlying_price: dec!(100),
            contracts,
        };

        let mut long_inputs = inputs();
        long_inputs.strategy = StrategyKind::LongStrangle;
        long_inputs.days_to_expiry = 20;
        let mut short_inputs = inputs();
        short_inputs.days_to_expiry = 20;

        let long_legs = long_strangle::find_optimal_strikes(&long_inputs, &chain).unwrap();
        let short_legs = find_optimal_strikes(&short_inputs, &chain).unwrap();

        assert!(short_legs.put_strike < long_legs.put_strike);
        assert!(short_legs.call_strike > long_legs.call_strike);
    }
}
