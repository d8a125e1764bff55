//! Bindings for the bounty contract: the view call used to authorize creation
//! and the events a payout transaction can emit.

use ethers::contract::{EthCall, EthEvent};
use ethers::abi::RawLog;
use ethers::types::{Address, Log, U256};

use crate::ChainError;

#[derive(Debug, Clone, PartialEq, Eq, EthCall)]
#[ethcall(name = "getBountyInfo", abi = "getBountyInfo(string)")]
pub struct GetBountyInfoCall {
    pub bounty_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, EthEvent)]
#[ethevent(name = "BountyCreated", abi = "BountyCreated(address,address,uint256)")]
pub struct BountyCreated {
    #[ethevent(indexed)]
    pub bounty: Address,
    #[ethevent(indexed)]
    pub creator: Address,
    pub reward: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, EthEvent)]
#[ethevent(name = "SubmissionAdded", abi = "SubmissionAdded(address,address,uint256)")]
pub struct SubmissionAdded {
    #[ethevent(indexed)]
    pub bounty: Address,
    #[ethevent(indexed)]
    pub hunter: Address,
    pub submission_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, EthEvent)]
#[ethevent(name = "BountyPaid", abi = "BountyPaid(address,address,uint256,uint256)")]
pub struct BountyPaid {
    #[ethevent(indexed)]
    pub bounty: Address,
    #[ethevent(indexed)]
    pub hunter: Address,
    pub submission_id: U256,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BountyEvent {
    Created(BountyCreated),
    SubmissionAdded(SubmissionAdded),
    Paid(BountyPaid),
}

impl BountyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "BountyCreated",
            Self::SubmissionAdded(_) => "SubmissionAdded",
            Self::Paid(_) => "BountyPaid",
        }
    }

    /// Decode a log against the contract's events, matched on `topics[0]`.
    pub fn decode(log: &Log) -> Result<Self, ChainError> {
        let topic0 = *log
            .topics
            .first()
            .ok_or_else(|| ChainError::InvalidResponse("log has no topics".into()))?;
        let raw = RawLog {
            topics: log.topics.clone(),
            data: log.data.to_vec(),
        };

        let event = if topic0 == BountyCreated::signature() {
            Self::Created(BountyCreated::decode_log(&raw)?)
        } else if topic0 == SubmissionAdded::signature() {
            Self::SubmissionAdded(SubmissionAdded::decode_log(&raw)?)
        } else if topic0 == BountyPaid::signature() {
            Self::Paid(BountyPaid::decode_log(&raw)?)
        } else {
            return Err(ChainError::UnknownEvent(topic0));
        };
        Ok(event)
    }

    /// A payout of a real bounty: `BountyPaid` with a non-zero bounty address.
    pub fn is_payment(&self) -> bool {
        matches!(self, Self::Paid(paid) if !paid.bounty.is_zero())
    }
}

/// First log of a transaction, with the contract that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub emitter: Address,
    pub event: BountyEvent,
}

impl EmittedEvent {
    /// A payment event emitted by `contract` itself. Logs from any other
    /// address can be forged by anyone and authorize nothing.
    pub fn is_payment_from(&self, contract: &Address) -> bool {
        self.emitter == *contract && self.event.is_payment()
    }
}
