use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TipSelectError {
    /// No tips are available in the node
    #[error("no tips available")]
    NoTipsAvailable,

    /// The selection policy is malformed; fatal to the caller
    #[error("invalid tip selection policy: {0}")]
    InvalidPolicy(&'static str),
}

pub type TipSelectResult<T> = std::result::Result<T, TipSelectError>;
