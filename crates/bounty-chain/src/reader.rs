use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, H256, TransactionRequest, U256};
use tracing::{debug, warn};

use crate::contract::{BountyEvent, EmittedEvent, GetBountyInfoCall};
use crate::{BountyInfo, ChainError, ChainReader, SupportedChain};

/// Reads the bounty contract through a JSON-RPC endpoint.
pub struct RpcChainReader {
    provider: Provider<Http>,
    chain: SupportedChain,
    url: String,
}

impl RpcChainReader {
    pub fn new(chain: SupportedChain, rpc_url: &str) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| ChainError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            provider,
            chain,
            url: rpc_url.to_string(),
        })
    }

    pub fn chain(&self) -> SupportedChain {
        self.chain
    }

    /// Compare the endpoint's chain id with the configured chain.
    pub async fn check_chain_id(&self) -> Result<bool, ChainError> {
        let remote = self.provider.get_chainid().await?;
        let matches = remote == U256::from(self.chain.id());
        if !matches {
            warn!(
                "RPC endpoint {} reports chain id {}, configured {}",
                self.url, remote, self.chain
            );
        }
        Ok(matches)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn bounty_info(&self, contract: &Address, bounty_id: &str) -> Result<BountyInfo, ChainError> {
        let call = GetBountyInfoCall {
            bounty_id: bounty_id.to_string(),
        };
        let tx = TransactionRequest::new().to(*contract).data(call.encode());

        let ret = self.provider.call(&tx.into(), None).await?;
        let info = BountyInfo::decode(&ret)?;

        debug!("On-chain bounty {}: {:?}", bounty_id, info);
        Ok(info)
    }

    async fn payment_event(&self, hash: H256) -> Result<Option<EmittedEvent>, ChainError> {
        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            debug!("No receipt for {:?}", hash);
            return Ok(None);
        };
        let Some(log) = receipt.logs.first() else {
            debug!("Receipt for {:?} has no logs (status {:?})", hash, receipt.status);
            return Ok(None);
        };

        let event = BountyEvent::decode(log)?;
        debug!("First log of {:?} (emitted by {:?}): {}", hash, log.address, event.name());
        Ok(Some(EmittedEvent {
            emitter: log.address,
            event,
        }))
    }
}
