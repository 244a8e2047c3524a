//! Compatibility layer for callers still using the flat request shape.
//! Normalizes the request into `StrategyInputs`, fetches a chain from the
//! market-data collaborator when none was supplied, and offers pre-flight
//! feasibility validation that separates hard errors from warnings.

use chrono::{Datelike, Duration, Local, NaiveDate, Timelike, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::{OptionChain, OptionKind};
use crate::error::StrategyEngineError;
use crate::factory;
use crate::strategies::{StrategyInputs, StrategyKind, StrategyResult};
use crate::types::{ComputationOutput, Money, Rate};
use crate::EngineResult;

/// On expiration Fridays, requests after this hour roll to the next cycle.
const EXPIRATION_CUTOFF_HOUR: u32 = 12;

/// Below this many quoted strikes per side, selection quality degrades;
/// flagged as a warning, not a failure.
const COMFORTABLE_STRIKES_PER_SIDE: usize = 10;

/// Flat legacy request shape. Only strategy, symbol and price are
/// mandatory; everything else is derived or fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub strategy: String,
    pub symbol: String,
    pub current_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_percentile: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<OptionChain>,
}

/// External market-data collaborator. The engine calls this at most once
/// per request and never retries; retry and backoff policy belong to the
/// caller.
pub trait MarketDataProvider {
    fn fetch_chain(&self, symbol: &str, current_price: Money) -> EngineResult<OptionChain>;
}

/// Pre-flight feasibility report. Errors block the calculation; warnings
/// describe degraded conditions the caller may accept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Request normalization
// ---------------------------------------------------------------------------

/// Next weekly expiration Friday. A request on a Friday before the cutoff
/// keeps that same day; past the cutoff it rolls a full week.
fn default_expiration(today: NaiveDate, hour: u32) -> NaiveDate {
    let days_ahead = match today.weekday() {
        Weekday::Fri if hour >= EXPIRATION_CUTOFF_HOUR => 7,
        Weekday::Fri => 0,
        weekday => {
            (Weekday::Fri.num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7
        }
    };
    today + Duration::days(i64::from(days_ahead))
}

/// Normalize against an explicit clock; the public path uses `Local::now`.
fn normalize_request_at(
    request: &CalculationRequest,
    today: NaiveDate,
    hour: u32,
) -> EngineResult<StrategyInputs> {
    let strategy = StrategyKind::from_identifier(&request.strategy)?;

    let expiration = request
        .expiration
        .unwrap_or_else(|| default_expiration(today, hour));
    if expiration < today {
        return Err(StrategyEngineError::InvalidInput {
            field: "expiration".into(),
            reason: format!("{expiration} is in the past"),
        });
    }

    let days_to_expiry = match request.days_to_expiry {
        Some(dte) => dte,
        None => (expiration - today).num_days() as u32,
    };

    Ok(StrategyInputs {
        strategy,
        symbol: request.symbol.clone(),
        current_price: request.current_price,
        expiration,
        days_to_expiry,
        implied_volatility: request.implied_volatility,
        iv_percentile: request.iv_percentile,
    })
}

pub fn normalize_request(request: &CalculationRequest) -> EngineResult<StrategyInputs> {
    let now = Local::now();
    normalize_request_at(request, now.date_naive(), now.hour())
}

// ---------------------------------------------------------------------------
// Calculation entry point
// ---------------------------------------------------------------------------

/// Legacy-shape entry point: normalize, ensure a chain is present, then
/// delegate to the factory. A fetch failure surfaces as-is; the engine
/// does not retry.
pub fn calculate(
    request: &CalculationRequest,
    provider: &dyn MarketDataProvider,
) -> EngineResult<ComputationOutput<StrategyResult>> {
    let inputs = normalize_request(request)?;
    match &request.chain {
        Some(chain) => factory::calculate(&inputs, chain),
        None => {
            let chain = provider.fetch_chain(&request.symbol, request.current_price)?;
            factory::calculate(&inputs, &chain)
        }
    }
}

// ---------------------------------------------------------------------------
// Pre-flight validation
// ---------------------------------------------------------------------------

/// Structural feasibility check before committing to a calculation.
pub fn validate_strategy_data(
    kind: StrategyKind,
    chain: &OptionChain,
    current_price: Money,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if chain.is_empty() {
        report.errors.push("options chain is empty".into());
    }
    if current_price <= Decimal::ZERO {
        report
            .errors
            .push(format!("current price {current_price} must be positive"));
    }
    if !report.errors.is_empty() {
        return report;
    }

    let calls = chain
        .contracts
        .iter()
        .filter(|c| c.kind == OptionKind::Call)
        .count();
    let puts = chain
        .contracts
        .iter()
        .filter(|c| c.kind == OptionKind::Put)
        .count();
    let expirations = chain.expirations().len();

    match kind {
        StrategyKind::LongStrangle | StrategyKind::ShortStrangle => {
            if calls < 1 || puts < 1 {
                report.errors.push(format!(
                    "strangle needs at least 1 call and 1 put (found {calls} calls, {puts} puts)"
                ));
            }
        }
        StrategyKind::IronCondor => {
            if calls < 4 || puts < 4 {
                report.errors.push(format!(
                    "iron condor needs at least 4 calls and 4 puts (found {calls} calls, \
                     {puts} puts)"
                ));
            }
        }
        StrategyKind::ButterflySpread => {
            if calls < 6 {
                report.errors.push(format!(
                    "butterfly needs at least 6 call strikes (found {calls})"
                ));
            }
        }
        StrategyKind::DiagonalCalendar => {
            if expirations < 2 {
                report.errors.push(format!(
                    "diagonal calendar needs 2 distinct expirations (found {expirations})"
                ));
            }
        }
    }

    if calls < COMFORTABLE_STRIKES_PER_SIDE || puts < COMFORTABLE_STRIKES_PER_SIDE {
        report.warnings.push(format!(
            "limited strikes available ({calls} calls, {puts} puts); selection may be coarse"
        ));
    }

    report
}
