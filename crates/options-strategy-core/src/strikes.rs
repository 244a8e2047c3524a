//! Shared strike-selection math: tiered OTM distances, directional scans
//! over the quoted strike list, and premium extraction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::chain::OptionContract;
use crate::types::{Money, Rate};

/// Days-to-expiry horizon tiers.
const SHORT_HORIZON_MAX_DTE: u32 = 7;
const MEDIUM_HORIZON_MAX_DTE: u32 = 30;

/// How far from the money a leg's target strike sits, as a class of
/// strategy. Credit structures take wider strikes for safety margin;
/// debit structures take narrower strikes for cheaper premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceClass {
    /// Debit legs: long strangle, butterfly wings, calendar offset.
    Debit,
    /// Credit legs: short strangle, condor short strikes.
    Credit,
    /// Condor protective wings, offset beyond the short strike.
    WingOffset,
}

/// Which quoted strike to take relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// First quoted strike strictly greater than target; highest available
    /// if none exists.
    Above,
    /// First quoted strike strictly less than target (scanning down);
    /// lowest available if none exists.
    Below,
    /// Minimum absolute distance to target, first in the sorted list on a
    /// tie. Used for the butterfly center only.
    Nearest,
}

/// Percentage distance from the money for a leg, tiered on days-to-expiry.
pub fn otm_distance_pct(class: DistanceClass, days_to_expiry: u32) -> Rate {
    match class {
        DistanceClass::Debit => {
            if days_to_expiry <= SHORT_HORIZON_MAX_DTE {
                dec!(0.03)
            } else if days_to_expiry <= MEDIUM_HORIZON_MAX_DTE {
                dec!(0.05)
            } else {
                dec!(0.07)
            }
        }
        DistanceClass::Credit => {
            if days_to_expiry <= SHORT_HORIZON_MAX_DTE {
                dec!(0.04)
            } else if days_to_expiry <= MEDIUM_HORIZON_MAX_DTE {
                dec!(0.07)
            } else {
                dec!(0.10)
            }
        }
        DistanceClass::WingOffset => {
            if days_to_expiry <= SHORT_HORIZON_MAX_DTE {
                dec!(0.02)
            } else if days_to_expiry <= MEDIUM_HORIZON_MAX_DTE {
                dec!(0.03)
            } else {
                dec!(0.04)
            }
        }
    }
}

/// Absolute target distance from the current price.
pub fn target_distance(current_price: Money, class: DistanceClass, days_to_expiry: u32) -> Money {
    current_price * otm_distance_pct(class, days_to_expiry)
}

/// Resolve a target to an actually quoted strike. `strikes` must be sorted
/// ascending. The Above/Below scans use strict inequality: an exact match
/// at the target moves one increment further out.
pub fn select_strike(
    strikes: &[Money],
    target: Money,
    direction: SearchDirection,
) -> Option<Money> {
    if strikes.is_empty() {
        return None;
    }
    match direction {
        SearchDirection::Above => strikes
            .iter()
            .find(|s| **s > target)
            .or_else(|| strikes.last())
            .copied(),
        SearchDirection::Below => strikes
            .iter()
            .rev()
            .find(|s| **s < target)
            .or_else(|| strikes.first())
            .copied(),
        SearchDirection::Nearest => {
            let mut best = strikes[0];
            let mut best_dist = (strikes[0] - target).abs();
            for s in &strikes[1..] {
                let dist = (*s - target).abs();
                if dist < best_dist {
                    best = *s;
                    best_dist = dist;
                }
            }
            Some(best)
        }
    }
}

/// Premium for a quoted contract: bid/ask midpoint, falling back to the
/// last trade when either side of the quote is missing or zero. `None`
/// when the contract has no usable quote at all.
pub fn mid_premium(contract: &OptionContract) -> Option<Money> {
    match (contract.bid, contract.ask) {
        (Some(bid), Some(ask)) if bid > Decimal::ZERO && ask > Decimal::ZERO => {
            Some((bid + ask) / dec!(2))
        }
        _ => contract.last.filter(|last| *last > Decimal::ZERO),
    }
}
