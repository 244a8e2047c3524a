use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyEngineError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient market data for {strategy} on {symbol}: {reason}")]
    InsufficientMarketData {
        strategy: String,
        symbol: String,
        reason: String,
    },

    #[error("Unprofitable structure for {strategy} on {symbol}: {reason}")]
    UnprofitableStructure {
        strategy: String,
        symbol: String,
        reason: String,
    },

    #[error("Invariant violation in {strategy} on {symbol}: {reason}")]
    InvariantViolation {
        strategy: String,
        symbol: String,
        reason: String,
    },

    #[error("Strategy not implemented: {name}")]
    StrategyNotImplemented { name: String },

    #[error("Market data unavailable for {symbol}: {reason}")]
    MarketDataUnavailable { symbol: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StrategyEngineError {
    fn from(e: serde_json::Error) -> Self {
        StrategyEngineError::SerializationError(e.to_string())
    }
}
