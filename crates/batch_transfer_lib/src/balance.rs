use crate::accounts::SenderAccount;
use crate::error::*;
use crate::transaction::ChainClient;
use crate::utils::{u256_to_rust_dec, U256ConvExt};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use web3::types::Address;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub gas: Option<String>,
    pub gas_decimal: Option<String>,
    pub token: Option<String>,
    pub token_decimal: Option<String>,
}

///Query gas and token balances of every wallet in the list. Results are
///keyed by address so the output order is stable regardless of tasks.
pub async fn scan_balances<C: ChainClient>(
    client: &C,
    private_keys: &[String],
    token_address: Option<Address>,
    token_decimals: Option<u32>,
    tasks: usize,
) -> Result<BTreeMap<String, BalanceResult>, TransferError> {
    let mut addresses = Vec::with_capacity(private_keys.len());
    for (no, key) in private_keys.iter().enumerate() {
        match SenderAccount::from_private_key(key) {
            Ok(sender) => addresses.push(sender.address),
            Err(e) => log::warn!("Wallet {} skipped: {}", no + 1, e),
        }
    }

    let result_map = Rc::new(RefCell::new(BTreeMap::<String, BalanceResult>::new()));
    let result_map_ = result_map.clone();
    stream::iter(addresses)
        .for_each_concurrent(tasks.max(1), |address| {
            let result_map = result_map_.clone();
            async move {
                log::debug!("Getting balance for account: {:#x}", address);
                let balance = match client.get_balance(address, token_address, true).await {
                    Ok(balance) => balance,
                    Err(e) => {
                        log::warn!("Balance query failed for {:#x}: {}", address, e);
                        return;
                    }
                };
                let gas = balance.gas_balance.map(|b| b.to_string());
                let gas_decimal = balance
                    .gas_balance
                    .map(|v| v.to_eth().unwrap_or_default().to_string());
                let token = balance.token_balance.map(|b| b.to_string());
                let token_decimal = balance.token_balance.map(|v| {
                    u256_to_rust_dec(v, token_decimals)
                        .unwrap_or_default()
                        .to_string()
                });
                result_map.borrow_mut().insert(
                    format!("{:#x}", address),
                    BalanceResult {
                        gas,
                        gas_decimal,
                        token,
                        token_decimal,
                    },
                );
            }
        })
        .await;

    Ok(result_map.take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth::{FeeEstimate, GetBalanceResult};
    use crate::planner::TransferMode;
    use web3::types::{H256, U256};

    struct StaticBalances;

    impl ChainClient for StaticBalances {
        async fn get_balance(
            &self,
            _address: Address,
            _token_address: Option<Address>,
            _check_gas: bool,
        ) -> Result<GetBalanceResult, TransferError> {
            Ok(GetBalanceResult {
                gas_balance: Some(U256::exp10(18)),
                token_balance: Some(U256::from(2_500_000_u64)),
            })
        }

        async fn get_fee_estimate(&self) -> Result<FeeEstimate, TransferError> {
            Ok(FeeEstimate {
                gas_price: U256::one(),
                gas_limit: U256::one(),
            })
        }

        async fn submit_transfer(
            &self,
            _sender: &SenderAccount,
            _recipient: Address,
            _amount: U256,
            _mode: &TransferMode,
            _fee: &FeeEstimate,
        ) -> Result<H256, TransferError> {
            Ok(H256::zero())
        }

        async fn await_confirmation(&self, _tx_hash: H256) -> Result<(), TransferError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_scan_balances() {
        let keys = vec![
            "0000000000000000000000000000000000000000000000000000000000000001".to_string(),
            "not a key".to_string(),
            "0000000000000000000000000000000000000000000000000000000000000002".to_string(),
        ];
        let balances = scan_balances(
            &StaticBalances,
            &keys,
            Some(Address::from_low_u64_be(42)),
            Some(6),
            2,
        )
        .await
        .unwrap();

        //bad key dropped, both valid wallets reported
        assert_eq!(balances.len(), 2);
        let first = balances
            .get("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf")
            .unwrap();
        assert_eq!(first.gas_decimal.as_deref(), Some("1"));
        assert_eq!(first.token_decimal.as_deref(), Some("2.5"));
    }
}
