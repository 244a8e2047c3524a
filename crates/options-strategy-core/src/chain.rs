use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionGreeks {
    pub delta: Decimal,
    pub gamma: Decimal,
    pub theta: Decimal,
    pub vega: Decimal,
}

/// One quoted contract as delivered by the market-data collaborator.
/// Read-only snapshot; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub strike: Money,
    pub kind: OptionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Money>,
    pub expiration: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<OptionGreeks>,
}

/// A quoted options chain plus the underlying price reading at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub symbol: String,
    pub underlying_price: Money,
    pub contracts: Vec<OptionContract>,
}

impl OptionChain {
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Contracts of one kind expiring on the given date.
    pub fn contracts_for(
        &self,
        kind: OptionKind,
        expiration: NaiveDate,
    ) -> impl Iterator<Item = &OptionContract> {
        self.contracts
            .iter()
            .filter(move |c| c.kind == kind && c.expiration == expiration)
    }

    /// Sorted, deduplicated strikes of one kind on the given expiration.
    pub fn strikes(&self, kind: OptionKind, expiration: NaiveDate) -> Vec<Money> {
        let mut strikes: Vec<Money> = self
            .contracts_for(kind, expiration)
            .map(|c| c.strike)
            .collect();
        strikes.sort();
        strikes.dedup();
        strikes
    }

    /// Lookup of the quoted contract at an exact (kind, expiration, strike).
    pub fn contract_at(
        &self,
        kind: OptionKind,
        expiration: NaiveDate,
        strike: Money,
    ) -> Option<&OptionContract> {
        self.contracts_for(kind, expiration)
            .find(|c| c.strike == strike)
    }

    /// Distinct expiration dates, ascending.
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.contracts.iter().map(|c| c.expiration).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// First expiration strictly after the given date, if any.
    pub fn next_expiration_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.expirations().into_iter().find(|d| *d > date)
    }

    pub fn count(&self, kind: OptionKind, expiration: NaiveDate) -> usize {
        self.contracts_for(kind, expiration).count()
    }
}
