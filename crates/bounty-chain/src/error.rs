use ethers::abi;
use ethers::providers::ProviderError;
use ethers::types::H256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failures and JSON-RPC error objects alike.
    #[error("RPC request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("undecodable contract data: {0}")]
    Abi(#[from] abi::Error),

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("unknown event topic {0:?}")]
    UnknownEvent(H256),
}
