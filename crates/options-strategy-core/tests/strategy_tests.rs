use chrono::{Duration, Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use options_strategy_core::adapter::{self, CalculationRequest, MarketDataProvider};
use options_strategy_core::chain::{OptionChain, OptionContract, OptionKind};
use options_strategy_core::factory;
use options_strategy_core::strategies::{PositionLegs, StrategyInputs, StrategyKind};
use options_strategy_core::types::{MaxLoss, Money, NetPremium};
use options_strategy_core::{EngineResult, StrategyEngineError};

// ===========================================================================
// Shared fixtures
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn near_expiration() -> NaiveDate {
    date(2025, 6, 20)
}

fn far_expiration() -> NaiveDate {
    date(2025, 7, 18)
}

fn contract(
    kind: OptionKind,
    strike: Money,
    premium: Money,
    expiration: NaiveDate,
) -> OptionContract {
    OptionContract {
        symbol: "XYZ".into(),
        strike,
        kind,
        bid: Some(premium - dec!(0.05)),
        ask: Some(premium + dec!(0.05)),
        last: Some(premium),
        expiration,
        volume: Some(500),
        open_interest: Some(2000),
        implied_volatility: Some(dec!(0.30)),
        greeks: None,
    }
}

/// Quoted chain around an underlying at 100: strikes 80-120 in 5-point
/// increments on two expirations, premiums decaying away from the money.
/// Bid/ask straddle the listed premium, so the midpoint recovers it.
fn chain_for(near: NaiveDate, far: NaiveDate) -> OptionChain {
    let call_premiums = [
        (dec!(80), dec!(20.20)),
        (dec!(85), dec!(15.40)),
        (dec!(90), dec!(10.80)),
        (dec!(95), dec!(6.60)),
        (dec!(100), dec!(3.50)),
        (dec!(105), dec!(1.60)),
        (dec!(110), dec!(0.70)),
        (dec!(115), dec!(0.30)),
        (dec!(120), dec!(0.15)),
    ];

    let mut contracts = Vec::new();
    for (strike, premium) in call_premiums {
        contracts.push(contract(OptionKind::Call, strike, premium, near));
        // Far-month calls carry extra time value.
        contracts.push(contract(OptionKind::Call, strike, premium + dec!(1.20), far));
        // Puts mirror the call surface around the money.
        let mirrored = dec!(200) - strike;
        contracts.push(contract(OptionKind::Put, mirrored, premium, near));
    }

    OptionChain {
        symbol: "XYZ".into(),
        underlying_price: dec!(100),
        contracts,
    }
}

fn reference_chain() -> OptionChain {
    chain_for(near_expiration(), far_expiration())
}

fn inputs_for(kind: StrategyKind) -> StrategyInputs {
    StrategyInputs {
        strategy: kind,
        symbol: "XYZ".into(),
        current_price: dec!(100),
        expiration: near_expiration(),
        days_to_expiry: 20,
        implied_volatility: Some(dec!(0.30)),
        iv_percentile: Some(dec!(60)),
    }
}

// ===========================================================================
// Cross-strategy properties
// ===========================================================================

#[test]
fn test_breakeven_ordering_holds_for_every_strategy() {
    let chain = reference_chain();
    for kind in StrategyKind::ALL {
        let output = factory::calculate(&inputs_for(kind), &chain)
            .unwrap_or_else(|e| panic!("{kind:?} failed: {e}"));
        let result = output.result;
        assert!(
            result.lower_breakeven < result.upper_breakeven,
            "{kind:?}: {} >= {}",
            result.lower_breakeven,
            result.upper_breakeven
        );
    }
}

#[test]
fn test_pl_is_zero_at_breakevens_except_calendar() {
    // Within a cent per share of rounding tolerance; the diagonal
    // calendar is excluded as its P&L model is an approximation.
    let tolerance = dec!(1.00);
    let chain = reference_chain();
    for kind in StrategyKind::ALL {
        if kind == StrategyKind::DiagonalCalendar {
            continue;
        }
        let result = factory::calculate(&inputs_for(kind), &chain).unwrap().result;
        for breakeven in [result.lower_breakeven, result.upper_breakeven] {
            let pl = factory::profit_loss_at_price(&result, breakeven).unwrap();
            assert!(
                pl.abs() <= tolerance,
                "{kind:?}: P&L {pl} at breakeven {breakeven}"
            );
        }
    }
}

#[test]
fn test_selected_strikes_exist_in_chain() {
    let chain = reference_chain();
    for kind in StrategyKind::ALL {
        let result = factory::calculate(&inputs_for(kind), &chain).unwrap().result;
        match result.legs {
            PositionLegs::Strangle(l) => {
                assert!(chain
                    .strikes(OptionKind::Put, near_expiration())
                    .contains(&l.put_strike));
                assert!(chain
                    .strikes(OptionKind::Call, near_expiration())
                    .contains(&l.call_strike));
            }
            PositionLegs::IronCondor(l) => {
                let puts = chain.strikes(OptionKind::Put, near_expiration());
                let calls = chain.strikes(OptionKind::Call, near_expiration());
                assert!(puts.contains(&l.long_put_strike));
                assert!(puts.contains(&l.short_put_strike));
                assert!(calls.contains(&l.short_call_strike));
                assert!(calls.contains(&l.long_call_strike));
            }
            PositionLegs::Butterfly(l) => {
                let calls = chain.strikes(OptionKind::Call, near_expiration());
                assert!(calls.contains(&l.lower_strike));
                assert!(calls.contains(&l.center_strike));
                assert!(calls.contains(&l.upper_strike));
            }
            PositionLegs::Calendar(l) => {
                assert!(chain
                    .strikes(OptionKind::Call, l.short_expiration)
                    .contains(&l.short_strike));
                assert!(chain
                    .strikes(OptionKind::Call, l.long_expiration)
                    .contains(&l.long_strike));
            }
        }
    }
}

#[test]
fn test_credit_strategies_report_credit_and_debit_strategies_debit() {
    let chain = reference_chain();
    for kind in StrategyKind::ALL {
        let result = factory::calculate(&inputs_for(kind), &chain).unwrap().result;
        match kind {
            StrategyKind::ShortStrangle | StrategyKind::IronCondor => {
                assert!(matches!(result.net_premium, NetPremium::Credit(c) if c > Decimal::ZERO));
            }
            _ => {
                assert!(matches!(result.net_premium, NetPremium::Debit(d) if d > Decimal::ZERO));
            }
        }
    }
}

// ===========================================================================
// Worked example: long strangle strike selection
// ===========================================================================

#[test]
fn test_long_strangle_strict_inequality_worked_example() {
    // Underlying 100, DTE 20 (medium tier, 5% distance), strikes
    // 90/95/100/105/110 on both sides. The put target lands exactly on
    // the quoted 95 strike; the strict below-scan therefore selects 90,
    // and the call side symmetrically selects 110 over 105.
    let exp = near_expiration();
    let mut contracts = Vec::new();
    for (strike, put_premium, call_premium) in [
        (dec!(90), dec!(1.00), dec!(11.00)),
        (dec!(95), dec!(2.00), dec!(7.00)),
        (dec!(100), dec!(4.00), dec!(4.00)),
        (dec!(105), dec!(7.00), dec!(2.00)),
        (dec!(110), dec!(11.00), dec!(1.00)),
    ] {
        contracts.push(contract(OptionKind::Put, strike, put_premium, exp));
        contracts.push(contract(OptionKind::Call, strike, call_premium, exp));
    }
    let chain = OptionChain {
        symbol: "XYZ".into(),
        underlying_price: dec!(100),
        contracts,
    };

    let result = factory::calculate(&inputs_for(StrategyKind::LongStrangle), &chain)
        .unwrap()
        .result;
    let PositionLegs::Strangle(legs) = result.legs else {
        panic!("expected strangle legs");
    };

    assert_eq!(legs.put_strike, dec!(90));
    assert_eq!(legs.call_strike, dec!(110));
    // Premiums come from the 90/110 quotes, not the 95/105 ones.
    assert_eq!(legs.put_premium, dec!(1.00));
    assert_eq!(legs.call_premium, dec!(1.00));
    assert_eq!(result.lower_breakeven, dec!(88));
    assert_eq!(result.upper_breakeven, dec!(112));
    assert_eq!(result.max_loss, MaxLoss::Finite(dec!(200.00)));
    assert_eq!(result.max_profit, None);
}

// ===========================================================================
// Worked example: iron condor position math
// ===========================================================================

#[test]
fn test_iron_condor_reference_position_worked_example() {
    use options_strategy_core::strategies::{iron_condor, IronCondorLegs};

    // Sell the 95 put and 105 call at 1.00 each, buy the 90 put and 110
    // call at 0.50 each: 1.00 net credit on 5-point wings.
    let legs = IronCondorLegs {
        long_put_strike: dec!(90),
        long_put_premium: dec!(0.50),
        short_put_strike: dec!(95),
        short_put_premium: dec!(1.00),
        short_call_strike: dec!(105),
        short_call_premium: dec!(1.00),
        long_call_strike: dec!(110),
        long_call_premium: dec!(0.50),
    };
    let result = iron_condor::calculate_position(&inputs_for(StrategyKind::IronCondor), &legs)
        .unwrap();

    assert_eq!(result.net_premium, NetPremium::Credit(dec!(1.00)));
    assert_eq!(result.max_profit, Some(dec!(100.00)));
    assert_eq!(result.max_loss, MaxLoss::Finite(dec!(400.00)));
    assert_eq!(result.lower_breakeven, dec!(94));
    assert_eq!(result.upper_breakeven, dec!(106));
}

// ===========================================================================
// Factory surface
// ===========================================================================

#[test]
fn test_short_strangle_loss_is_sentinel_not_number() {
    let chain = reference_chain();
    let result = factory::calculate(&inputs_for(StrategyKind::ShortStrangle), &chain)
        .unwrap()
        .result;
    assert_eq!(result.max_loss, MaxLoss::Unlimited);
    assert_eq!(result.max_loss.finite(), None);
    assert!(result.max_profit.is_some());
}

#[test]
fn test_pl_curve_spans_70_to_130_percent() {
    let chain = reference_chain();
    for kind in StrategyKind::ALL {
        let result = factory::calculate(&inputs_for(kind), &chain).unwrap().result;
        let curve = factory::calculate_pl_curve(&result, None).unwrap();
        assert_eq!(curve.len(), factory::DEFAULT_PL_SAMPLES as usize);
        assert_eq!(curve[0].price, dec!(70));
        assert_eq!(curve[curve.len() - 1].price, dec!(130));
    }
}

#[test]
fn test_envelope_flags_defaulted_iv() {
    let chain = reference_chain();
    let mut inputs = inputs_for(StrategyKind::LongStrangle);
    inputs.implied_volatility = None;

    let output = factory::calculate(&inputs, &chain).unwrap();
    assert!(output
        .warnings
        .iter()
        .any(|w| w.contains("implied volatility")));
    assert!(!output.methodology.is_empty());
    assert_eq!(output.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_envelope_flags_calendar_approximation() {
    let chain = reference_chain();
    let output = factory::calculate(&inputs_for(StrategyKind::DiagonalCalendar), &chain).unwrap();
    assert!(output.warnings.iter().any(|w| w.contains("estimate")));
}

// ===========================================================================
// Adapter end-to-end
// ===========================================================================

/// Serves the reference chain quoted on expirations relative to the
/// real clock, since the adapter rejects stale expirations.
struct FixedProvider {
    near: NaiveDate,
    far: NaiveDate,
}

impl FixedProvider {
    fn new() -> Self {
        let today = Local::now().date_naive();
        FixedProvider {
            near: today + Duration::days(20),
            far: today + Duration::days(48),
        }
    }
}

impl MarketDataProvider for FixedProvider {
    fn fetch_chain(&self, _symbol: &str, _current_price: Money) -> EngineResult<OptionChain> {
        Ok(chain_for(self.near, self.far))
    }
}

#[test]
fn test_adapter_fetches_chain_when_absent() {
    let provider = FixedProvider::new();
    let request = CalculationRequest {
        strategy: "iron_condor".into(),
        symbol: "XYZ".into(),
        current_price: dec!(100),
        expiration: Some(provider.near),
        days_to_expiry: Some(20),
        implied_volatility: Some(dec!(0.35)),
        iv_percentile: None,
        chain: None,
    };

    let output = adapter::calculate(&request, &provider).unwrap();
    assert_eq!(output.result.strategy, StrategyKind::IronCondor);
    assert!(matches!(output.result.max_loss, MaxLoss::Finite(_)));
}

#[test]
fn test_adapter_rejects_unknown_strategy_before_fetch() {
    let request = CalculationRequest {
        strategy: "calendar_butterfly".into(),
        symbol: "XYZ".into(),
        current_price: dec!(100),
        expiration: None,
        days_to_expiry: None,
        implied_volatility: None,
        iv_percentile: None,
        chain: None,
    };

    assert!(matches!(
        adapter::calculate(&request, &FixedProvider::new()).unwrap_err(),
        StrategyEngineError::StrategyNotImplemented { .. }
    ));
}
