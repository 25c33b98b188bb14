use thiserror::Error;

/// Failures of the order ingestion pipeline (decoding, capping, aggregation).
///
/// Plumbing around the pipeline (files, RPC, CLI) reports through
/// `anyhow::Error`; these convert into it with `?`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("encoded order buffer has length {len}, which is not a multiple of {record_len}")]
    MalformedBuffer { len: usize, record_len: usize },

    #[error("order {order} is missing required field `{field}`")]
    MissingField { field: &'static str, order: String },

    #[error("invalid amount {0:?}: expected a non-negative integer")]
    InvalidAmount(String),

    #[error("remaining balance of {account} for {token} would become negative")]
    NegativeRemainingBalance { account: String, token: String },

    #[error("order {order} has executed sell and buy amounts that disagree on being zero")]
    InconsistentExecution { order: String },

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("invalid token id {0:?}: expected `T` followed by a 16-bit number")]
    InvalidToken(String),
}

pub type Result<T> = std::result::Result<T, Error>;
