use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("run duration must be > 0s")]
    ZeroRunDuration,

    #[error("max concurrent must be <= {max}, got {given}")]
    TooManyConcurrent { given: u32, max: u32 },

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] clap::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no result data")]
    NoData,

    #[error("percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(u8),
}
