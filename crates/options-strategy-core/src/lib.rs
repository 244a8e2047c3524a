pub mod adapter;
pub mod chain;
pub mod error;
pub mod factory;
pub mod strategies;
pub mod strikes;
pub mod types;

pub use chain::{OptionChain, OptionContract, OptionGreeks, OptionKind};
pub use error::StrategyEngineError;
pub use strategies::{StrategyInputs, StrategyKind, StrategyResult};
pub use types::*;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, StrategyEngineError>;
