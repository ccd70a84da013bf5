use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use alloy::{
    network::{Ethereum, Network, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
    transports::{RpcError, TransportErrorKind},
};
use backon::{ExponentialBuilder, Retryable};
use tokio::time::timeout;
use tracing::{error, info};

use crate::{ChainProvider, ProviderError, TransactionStatus, erc20::IErc20};

/// [`ChainProvider`] backed by an Alloy [`RootProvider`].
///
/// Every RPC call is wrapped in a total timeout and retried with exponential
/// backoff up to `max_retries`. Built via
/// [`RpcChainProviderBuilder`](crate::rpc::RpcChainProviderBuilder).
#[derive(Clone, Debug)]
pub struct RpcChainProvider<N: Network = Ethereum> {
    pub(crate) provider: RootProvider<N>,
    pub(crate) call_timeout: Duration,
    pub(crate) max_retries: usize,
    pub(crate) min_delay: Duration,
}

impl<N: Network> RpcChainProvider<N> {
    /// Execute `operation` with exponential backoff and a total timeout.
    ///
    /// Wraps the retry logic with `tokio::time::timeout(self.call_timeout, ...)`
    /// so the entire operation (including time spent inside the RPC call)
    /// cannot exceed `call_timeout`.
    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Fn(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let retry_strategy = ExponentialBuilder::default()
            .with_max_times(self.max_retries)
            .with_min_delay(self.min_delay);

        timeout(
            self.call_timeout,
            (|| operation(self.provider.clone()))
                .retry(retry_strategy)
                .notify(|err: &RpcError<TransportErrorKind>, dur: Duration| {
                    info!(error = %err, "RPC error retrying after {:?}", dur);
                })
                .sleep(tokio::time::sleep),
        )
        .await
        .map_err(|_| ProviderError::Timeout)?
        .map_err(ProviderError::from)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
        info!("eth_getLogs called");
        let result = self
            .with_retry(move |provider| async move { provider.get_logs(filter).await })
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_getLogs failed");
        }
        result
    }

    async fn lookup_status(&self, hash: TxHash) -> Result<TransactionStatus, ProviderError> {
        info!("eth_getTransactionReceipt called");
        let receipt = self
            .with_retry(move |provider| async move { provider.get_transaction_receipt(hash).await })
            .await?;

        if let Some(receipt) = receipt {
            let status = if receipt.status() {
                TransactionStatus::Confirmed
            } else {
                TransactionStatus::Failed
            };
            return Ok(status);
        }

        // No receipt yet: distinguish a queued transaction from an unknown one.
        info!("eth_getTransactionByHash called");
        let transaction = self
            .with_retry(move |provider| async move { provider.get_transaction_by_hash(hash).await })
            .await?;

        Ok(if transaction.is_some() {
            TransactionStatus::Pending
        } else {
            TransactionStatus::NotFound
        })
    }
}

impl<N: Network> ChainProvider for RpcChainProvider<N> {
    async fn current_chain_height(&self) -> Result<u64, ProviderError> {
        info!("eth_blockNumber called");
        let result = self
            .with_retry(move |provider| async move { provider.get_block_number().await })
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_blockNumber failed");
        }
        result
    }

    /// Fetches `Transfer` logs involving `account` on either side.
    ///
    /// A single log filter cannot OR across topic positions, so two queries are
    /// issued (account as sender, account as recipient), then merged, deduped
    /// by `(transaction_hash, log_index)` and sorted chronologically.
    async fn fetch_logs(
        &self,
        contract: Address,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, ProviderError> {
        let base = Filter::new()
            .address(contract)
            .event_signature(IErc20::Transfer::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(to_block);

        let outgoing = base.clone().topic1(account.into_word());
        let incoming = base.topic2(account.into_word());

        let mut logs = self.get_logs(&outgoing).await?;
        logs.extend(self.get_logs(&incoming).await?);

        let mut seen = HashSet::new();
        logs.retain(|log| seen.insert((log.transaction_hash, log.log_index)));
        logs.sort_by_key(|log| (log.block_number, log.log_index));

        info!(
            log_count = logs.len(),
            from_block, to_block, "Fetched transfer logs for block range"
        );

        Ok(logs)
    }

    async fn fetch_statuses(
        &self,
        hashes: &[TxHash],
    ) -> Result<HashMap<TxHash, TransactionStatus>, ProviderError> {
        let mut statuses = HashMap::with_capacity(hashes.len());
        for &hash in hashes {
            let status = self.lookup_status(hash).await?;
            statuses.insert(hash, status);
        }
        Ok(statuses)
    }

    async fn submit(
        &self,
        contract: Address,
        call_data: Bytes,
        gas_price: u128,
        gas_limit: u64,
    ) -> Result<TxHash, ProviderError> {
        let request = N::TransactionRequest::default()
            .with_to(contract)
            .with_input(call_data)
            .with_gas_price(gas_price)
            .with_gas_limit(gas_limit);

        info!("eth_sendTransaction called");
        let result = self
            .with_retry(move |provider| {
                let request = request.clone();
                async move {
                    provider.send_transaction(request).await.map(|pending| *pending.tx_hash())
                }
            })
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_sendTransaction failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{B256, U64, U256},
        providers::mock::Asserter,
        rpc::client::RpcClient,
    };

    use super::*;
    use crate::{rpc::RpcChainProviderBuilder, test_utils::transfer_log};

    fn mocked_provider(asserter: Asserter) -> RpcChainProvider {
        let root = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter));
        RpcChainProviderBuilder::fragile(root).build()
    }

    #[tokio::test]
    async fn chain_height_is_decoded_from_quantity() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(1_234));
        let provider = mocked_provider(asserter);

        assert_eq!(provider.current_chain_height().await?, 1_234);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_logs_merges_and_dedupes_both_directions() -> anyhow::Result<()> {
        let account = Address::with_last_byte(0xA1);
        let other = Address::with_last_byte(0xB2);
        let shared =
            transfer_log(B256::with_last_byte(1), 0, account, other, U256::from(5), 10);
        let incoming_only =
            transfer_log(B256::with_last_byte(2), 1, other, account, U256::from(7), 9);

        let asserter = Asserter::new();
        // outgoing query, then incoming query (overlapping on `shared`)
        asserter.push_success(&vec![shared.clone()]);
        asserter.push_success(&vec![incoming_only.clone(), shared.clone()]);
        let provider = mocked_provider(asserter);

        let logs = provider.fetch_logs(Address::ZERO, account, 1, 10).await?;

        assert_eq!(logs.len(), 2);
        // sorted by block number: block 9 before block 10
        assert_eq!(logs[0].transaction_hash, incoming_only.transaction_hash);
        assert_eq!(logs[1].transaction_hash, shared.transaction_hash);
        Ok(())
    }

    #[tokio::test]
    async fn missing_receipt_and_transaction_means_not_found() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        asserter.push_success(&serde_json::Value::Null); // no receipt
        asserter.push_success(&serde_json::Value::Null); // no transaction
        let provider = mocked_provider(asserter);

        let hash = B256::with_last_byte(9);
        let statuses = provider.fetch_statuses(&[hash]).await?;

        assert_eq!(statuses[&hash], TransactionStatus::NotFound);
        Ok(())
    }
}
