//! Authoritative on-chain state for the bounty service.
//!
//! The service never writes to the chain. It reads two things:
//! - the bounty record behind `getBountyInfo(string)`, to authorize creation;
//! - the first event of a payout transaction, to authorize completion.

pub mod chains;
pub mod contract;
pub mod error;
pub mod reader;

use async_trait::async_trait;
use ethers::abi::{self, ParamType, Token};

pub use chains::SupportedChain;
pub use contract::{BountyCreated, BountyEvent, BountyPaid, EmittedEvent, SubmissionAdded};
pub use error::ChainError;
pub use ethers::types::{Address, H256, I256, U256};
pub use reader::RpcChainReader;

#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn bounty_info(&self, contract: &Address, bounty_id: &str) -> Result<BountyInfo, ChainError>;

    /// The decoded first log of the transaction, or `None` if the transaction
    /// is unknown or emitted nothing.
    async fn payment_event(&self, hash: H256) -> Result<Option<EmittedEvent>, ChainError>;
}

/// Return tuple of `getBountyInfo`:
/// `(address creator, uint256 reward, uint256 submissions, int256 balance)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BountyInfo {
    pub creator: Address,
    pub reward: U256,
    pub submissions: U256,
    pub balance: I256,
}

impl BountyInfo {
    const RETURN_LEN: usize = 4 * 32;

    pub fn decode(data: &[u8]) -> Result<Self, ChainError> {
        if data.len() != Self::RETURN_LEN {
            return Err(ChainError::InvalidResponse(format!(
                "getBountyInfo returned {} bytes, expected {}",
                data.len(),
                Self::RETURN_LEN
            )));
        }

        let tokens = abi::decode(
            &[
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Int(256),
            ],
            data,
        )?;
        let [
            Token::Address(creator),
            Token::Uint(reward),
            Token::Uint(submissions),
            Token::Int(balance),
        ] = tokens.as_slice()
        else {
            return Err(ChainError::InvalidResponse(format!(
                "unexpected getBountyInfo tokens: {:?}",
                tokens
            )));
        };

        Ok(Self {
            creator: *creator,
            reward: *reward,
            submissions: *submissions,
            balance: I256::from_raw(*balance),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        abi::encode(&[
            Token::Address(self.creator),
            Token::Uint(self.reward),
            Token::Uint(self.submissions),
            Token::Int(self.balance.into_raw()),
        ])
    }

    /// An unset creator or a negative balance both mean the bounty does not exist.
    pub fn is_valid(&self) -> bool {
        !(self.creator.is_zero() || self.balance.is_negative())
    }
}
