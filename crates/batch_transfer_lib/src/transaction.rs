use crate::accounts::SenderAccount;
use crate::config::{Chain, Engine};
use crate::contracts::encode_erc20_transfer;
use crate::error::*;
use crate::eth::{
    get_balance, get_fee_estimate, get_transaction_count, FeeEstimate, GetBalanceResult,
    NATIVE_TRANSFER_GAS_LIMIT,
};
use crate::planner::TransferMode;
use crate::{err_create, err_custom_create, err_from, err_from_msg};
use std::future::Future;
use std::time::Duration;
use web3::transports::Http;
use web3::types::{Address, Bytes, CallRequest, TransactionParameters, H256, U256, U64};
use web3::Web3;

///The seam between the executor and the chain. The executor only ever talks
///to this trait, tests drive it with an in-memory implementation.
pub trait ChainClient {
    fn get_balance(
        &self,
        address: Address,
        token_address: Option<Address>,
        check_gas: bool,
    ) -> impl Future<Output = Result<GetBalanceResult, TransferError>> + Send;

    fn get_fee_estimate(&self) -> impl Future<Output = Result<FeeEstimate, TransferError>> + Send;

    ///Sign and broadcast one transfer, returning the pending transaction hash
    fn submit_transfer(
        &self,
        sender: &SenderAccount,
        recipient: Address,
        amount: U256,
        mode: &TransferMode,
        fee: &FeeEstimate,
    ) -> impl Future<Output = Result<H256, TransferError>> + Send;

    ///Wait until the transaction is mined or the configured timeout passes
    fn await_confirmation(
        &self,
        tx_hash: H256,
    ) -> impl Future<Output = Result<(), TransferError>> + Send;
}

pub struct Web3TransferClient {
    web3: Web3<Http>,
    chain_id: u64,
    confirmation_timeout: Duration,
    confirmation_poll: Duration,
}

impl Web3TransferClient {
    pub async fn connect(chain: &Chain, engine: &Engine) -> Result<Self, TransferError> {
        let transport = Http::new(&chain.rpc_url)
            .map_err(err_from_msg!("Failed to create provider for {}", chain.rpc_url))?;
        let web3 = Web3::new(transport);
        let chain_id = match chain.chain_id {
            Some(chain_id) => chain_id,
            None => web3
                .eth()
                .chain_id()
                .await
                .map_err(err_from_msg!("Failed to query chain id from {}", chain.rpc_url))?
                .as_u64(),
        };
        Ok(Web3TransferClient {
            web3,
            chain_id,
            confirmation_timeout: Duration::from_secs(engine.confirmation_timeout_secs),
            confirmation_poll: Duration::from_secs(engine.confirmation_poll_secs),
        })
    }

    pub fn web3(&self) -> &Web3<Http> {
        &self.web3
    }

    async fn estimate_call_gas(&self, call_request: CallRequest) -> Result<U256, TransferError> {
        let gas_est = match self.web3.eth().estimate_gas(call_request, None).await {
            Ok(gas_est) => gas_est,
            Err(e) => {
                if e.to_string().contains("gas required exceeds allowance") {
                    log::error!("Gas estimation failed - probably insufficient funds: {}", e);
                    return Err(err_custom_create!(
                        "Gas estimation failed - probably insufficient funds"
                    ));
                }
                return Err(err_custom_create!(
                    "Gas estimation failed due to unknown error {}",
                    e
                ));
            }
        };
        let add_gas_safety_margin: U256 = U256::from(20000);
        Ok(gas_est + add_gas_safety_margin)
    }
}

pub fn create_native_transfer(
    to: Address,
    amount: U256,
    chain_id: u64,
    gas_price: U256,
) -> TransactionParameters {
    TransactionParameters {
        to: Some(to),
        gas: U256::from(NATIVE_TRANSFER_GAS_LIMIT),
        gas_price: Some(gas_price),
        value: amount,
        chain_id: Some(chain_id),
        ..Default::default()
    }
}

pub fn create_erc20_transfer(
    token: Address,
    erc20_to: Address,
    erc20_amount: U256,
    chain_id: u64,
    gas_limit: U256,
    gas_price: U256,
) -> Result<TransactionParameters, TransferError> {
    Ok(TransactionParameters {
        to: Some(token),
        gas: gas_limit,
        gas_price: Some(gas_price),
        value: U256::zero(),
        data: Bytes(encode_erc20_transfer(erc20_to, erc20_amount).map_err(err_from!())?),
        chain_id: Some(chain_id),
        ..Default::default()
    })
}

impl ChainClient for Web3TransferClient {
    async fn get_balance(
        &self,
        address: Address,
        token_address: Option<Address>,
        check_gas: bool,
    ) -> Result<GetBalanceResult, TransferError> {
        get_balance(&self.web3, token_address, address, check_gas).await
    }

    async fn get_fee_estimate(&self) -> Result<FeeEstimate, TransferError> {
        get_fee_estimate(&self.web3).await
    }

    async fn submit_transfer(
        &self,
        sender: &SenderAccount,
        recipient: Address,
        amount: U256,
        mode: &TransferMode,
        fee: &FeeEstimate,
    ) -> Result<H256, TransferError> {
        let mut tx_params = match mode {
            TransferMode::Native => {
                create_native_transfer(recipient, amount, self.chain_id, fee.gas_price)
            }
            TransferMode::Token { address, .. } => {
                let call_data = encode_erc20_transfer(recipient, amount).map_err(err_from!())?;
                let gas_limit = self
                    .estimate_call_gas(CallRequest {
                        from: Some(sender.address),
                        to: Some(*address),
                        data: Some(Bytes(call_data)),
                        ..Default::default()
                    })
                    .await?;
                create_erc20_transfer(
                    *address,
                    recipient,
                    amount,
                    self.chain_id,
                    gas_limit,
                    fee.gas_price,
                )?
            }
        };

        let nonce = get_transaction_count(sender.address, &self.web3, true)
            .await
            .map_err(err_from_msg!("Failed to obtain transaction nonce"))?;
        tx_params.nonce = Some(U256::from(nonce));

        let signed = self
            .web3
            .accounts()
            .sign_transaction(tx_params, &sender.secret)
            .await
            .map_err(err_from!())?;

        self.web3
            .eth()
            .send_raw_transaction(signed.raw_transaction)
            .await
            .map_err(err_from!())?;

        Ok(signed.transaction_hash)
    }

    async fn await_confirmation(&self, tx_hash: H256) -> Result<(), TransferError> {
        let started = tokio::time::Instant::now();
        loop {
            let receipt = self
                .web3
                .eth()
                .transaction_receipt(tx_hash)
                .await
                .map_err(err_from!())?;
            if let Some(receipt) = receipt {
                return match receipt.status {
                    Some(status) if status == U64::from(1) => Ok(()),
                    _ => Err(err_create!(TransactionFailedError::new(&format!(
                        "Transaction {tx_hash:#x} reverted on chain"
                    )))),
                };
            }
            if started.elapsed() > self.confirmation_timeout {
                return Err(err_create!(TransactionFailedError::new(&format!(
                    "Transaction {:#x} not confirmed after {}s",
                    tx_hash,
                    self.confirmation_timeout.as_secs()
                ))));
            }
            tokio::time::sleep(self.confirmation_poll).await;
        }
    }
}
