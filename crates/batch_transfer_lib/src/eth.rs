use crate::contracts::{encode_erc20_balance_of, encode_erc20_decimals, encode_erc20_symbol};
use crate::error::*;
use crate::{err_create, err_custom_create, err_from};
use secp256k1::{PublicKey, SecretKey};
use sha3::Digest;
use sha3::Keccak256;
use web3::ethabi;
use web3::transports::Http;
use web3::types::{Address, Bytes, CallRequest, U256};
use web3::Web3;

///Gas limit of a plain value transfer, the smallest a transaction can use
pub const NATIVE_TRANSFER_GAS_LIMIT: u64 = 21000;

#[derive(Clone, Debug)]
pub struct GetBalanceResult {
    pub gas_balance: Option<U256>,
    pub token_balance: Option<U256>,
}

///Current network fee parameters for a plain value transfer
#[derive(Clone, Debug)]
pub struct FeeEstimate {
    pub gas_price: U256,
    pub gas_limit: U256,
}

impl FeeEstimate {
    pub fn fee_cost(&self) -> U256 {
        self.gas_price * self.gas_limit
    }
}

#[derive(Clone, Debug)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

pub async fn get_balance(
    web3: &Web3<Http>,
    token_address: Option<Address>,
    address: Address,
    check_gas: bool,
) -> Result<GetBalanceResult, TransferError> {
    log::debug!(
        "Checking balance for address {:#x}, token address: {:#x}, check_gas {}",
        address,
        token_address.unwrap_or_default(),
        check_gas,
    );

    let gas_balance = if check_gas {
        Some(web3.eth().balance(address, None).await.map_err(err_from!())?)
    } else {
        None
    };

    let token_balance = if let Some(token_address) = token_address {
        let call_data = encode_erc20_balance_of(address).map_err(err_from!())?;
        let res = web3
            .eth()
            .call(
                CallRequest {
                    to: Some(token_address),
                    data: Some(Bytes::from(call_data)),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(err_from!())?;
        if res.0.len() != 32 {
            return Err(err_create!(TransactionFailedError::new(&format!(
                "Invalid balance response: {:?}. Probably not a valid ERC20 contract {:#x}",
                res.0, token_address
            ))));
        };
        Some(U256::from_big_endian(&res.0))
    } else {
        None
    };
    Ok(GetBalanceResult {
        gas_balance,
        token_balance,
    })
}

pub async fn get_fee_estimate(web3: &Web3<Http>) -> Result<FeeEstimate, TransferError> {
    let gas_price = web3.eth().gas_price().await.map_err(err_from!())?;
    Ok(FeeEstimate {
        gas_price,
        gas_limit: U256::from(NATIVE_TRANSFER_GAS_LIMIT),
    })
}

pub async fn get_token_metadata(
    web3: &Web3<Http>,
    token_address: Address,
) -> Result<TokenMetadata, TransferError> {
    let res = web3
        .eth()
        .call(
            CallRequest {
                to: Some(token_address),
                data: Some(Bytes::from(
                    encode_erc20_decimals().map_err(err_from!())?,
                )),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(err_from!())?;
    let decoded = ethabi::decode(&[ethabi::ParamType::Uint(8)], &res.0).map_err(err_from!())?;
    //safe because the param type is known from the decode call
    let decimals = decoded[0].clone().into_uint().unwrap().as_u64();
    if decimals > 18 {
        return Err(err_custom_create!(
            "Token {:#x} has {} decimals, more than the supported 18",
            token_address,
            decimals
        ));
    }

    let res = web3
        .eth()
        .call(
            CallRequest {
                to: Some(token_address),
                data: Some(Bytes::from(encode_erc20_symbol().map_err(err_from!())?)),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(err_from!())?;
    let decoded = ethabi::decode(&[ethabi::ParamType::String], &res.0).map_err(err_from!())?;
    let symbol = decoded[0].clone().into_string().unwrap();

    Ok(TokenMetadata {
        symbol,
        decimals: decimals as u8,
    })
}

pub(crate) async fn get_transaction_count(
    address: Address,
    web3: &Web3<Http>,
    pending: bool,
) -> Result<u64, web3::Error> {
    let nonce_type = match pending {
        true => web3::types::BlockNumber::Pending,
        false => web3::types::BlockNumber::Latest,
    };
    let nonce = web3
        .eth()
        .transaction_count(address, Some(nonce_type))
        .await?;
    Ok(nonce.as_u64())
}

pub fn get_eth_addr_from_secret(secret_key: &SecretKey) -> Address {
    Address::from_slice(
        &Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_get_eth_addr_from_secret() {
        let sk =
            SecretKey::from_str("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap();
        let addr = format!("{:#x}", get_eth_addr_from_secret(&sk));
        assert_eq!(addr, "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn test_fee_cost() {
        let fee = FeeEstimate {
            gas_price: U256::from(1_000_000_000_u64),
            gas_limit: U256::from(NATIVE_TRANSFER_GAS_LIMIT),
        };
        assert_eq!(fee.fee_cost(), U256::from(21_000_000_000_000_u64));
    }
}
