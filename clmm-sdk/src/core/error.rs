use clmm_core::ClmmError;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    Core(#[from] ClmmError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Mint {0} does not belong to the pool")]
    UnknownMint(Pubkey),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Slippage {0} outside [0, 1)")]
    InvalidSlippage(f64),
}

pub type SdkResult<T> = Result<T, SdkError>;
