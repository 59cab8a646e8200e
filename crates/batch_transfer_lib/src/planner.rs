use crate::error::*;
use crate::eth::{FeeEstimate, GetBalanceResult, TokenMetadata};
use crate::utils::rust_dec_to_u256;
use crate::{err_custom_create, err_from};
use rust_decimal::Decimal;
use web3::types::{Address, U256};

///Native coin transfer or ERC20 token transfer. Token mode carries the
///contract address and the metadata resolved once per run.
#[derive(Clone, Debug)]
pub enum TransferMode {
    Native,
    Token {
        address: Address,
        metadata: TokenMetadata,
    },
}

impl TransferMode {
    pub fn token_address(&self) -> Option<Address> {
        match self {
            TransferMode::Native => None,
            TransferMode::Token { address, .. } => Some(*address),
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            TransferMode::Native => 18,
            TransferMode::Token { metadata, .. } => metadata.decimals as u32,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            TransferMode::Native => "native",
            TransferMode::Token { metadata, .. } => &metadata.symbol,
        }
    }
}

#[derive(Clone, Debug)]
pub enum AmountPolicy {
    SweepAll,
    Fixed(Decimal),
}

impl AmountPolicy {
    ///Fixed amounts are validated before the run starts, a zero or negative
    ///amount is a configuration error and never reaches per-sender planning
    pub fn fixed(amount: Decimal) -> Result<Self, TransferError> {
        if amount <= Decimal::ZERO {
            return Err(err_custom_create!(
                "Fixed transfer amount must be positive, got {}",
                amount
            ));
        }
        Ok(AmountPolicy::Fixed(amount))
    }
}

#[derive(Clone, Debug)]
pub enum PlanOutcome {
    Send(U256),
    InsufficientFunds(String),
}

///Decide how much one sender should transfer to each recipient.
///Native sweeps reserve the exact fee cost (gas price times gas limit),
///token amounts are never reduced by fees - those are paid from the native
///balance, which is only checked when gas headroom enforcement is on.
pub fn plan(
    balance: &GetBalanceResult,
    mode: &TransferMode,
    policy: &AmountPolicy,
    fee: Option<&FeeEstimate>,
    require_gas_headroom: bool,
) -> Result<PlanOutcome, TransferError> {
    match mode {
        TransferMode::Native => {
            let gas_balance = balance
                .gas_balance
                .ok_or(err_custom_create!("Native balance was not queried"))?;
            let fee = fee.ok_or(err_custom_create!(
                "Fee estimate is required for native transfers"
            ))?;
            let fee_cost = fee.fee_cost();
            match policy {
                AmountPolicy::SweepAll => {
                    let amount = gas_balance
                        .checked_sub(fee_cost)
                        .filter(|amount| !amount.is_zero());
                    match amount {
                        Some(amount) => Ok(PlanOutcome::Send(amount)),
                        None => Ok(PlanOutcome::InsufficientFunds(format!(
                            "balance {} does not cover fee {}",
                            gas_balance, fee_cost
                        ))),
                    }
                }
                AmountPolicy::Fixed(amount) => {
                    let amount = rust_dec_to_u256(*amount, Some(18)).map_err(err_from!())?;
                    let required = amount.checked_add(fee_cost).ok_or(err_custom_create!(
                        "Overflow computing required balance"
                    ))?;
                    if gas_balance < required {
                        Ok(PlanOutcome::InsufficientFunds(format!(
                            "balance {} below required {} (amount + fee)",
                            gas_balance, required
                        )))
                    } else {
                        Ok(PlanOutcome::Send(amount))
                    }
                }
            }
        }
        TransferMode::Token { metadata, .. } => {
            let token_balance = balance
                .token_balance
                .ok_or(err_custom_create!("Token balance was not queried"))?;
            if require_gas_headroom {
                let gas_balance = balance.gas_balance.ok_or(err_custom_create!(
                    "Native balance was not queried for gas headroom check"
                ))?;
                let fee = fee.ok_or(err_custom_create!(
                    "Fee estimate is required for gas headroom check"
                ))?;
                if gas_balance < fee.fee_cost() {
                    return Ok(PlanOutcome::InsufficientFunds(format!(
                        "native balance {} does not cover gas {} for a token transfer",
                        gas_balance,
                        fee.fee_cost()
                    )));
                }
            }
            match policy {
                AmountPolicy::SweepAll => {
                    if token_balance.is_zero() {
                        Ok(PlanOutcome::InsufficientFunds(
                            "token balance is zero".to_string(),
                        ))
                    } else {
                        //no fee subtraction, fees are paid in the native asset
                        Ok(PlanOutcome::Send(token_balance))
                    }
                }
                AmountPolicy::Fixed(amount) => {
                    let amount = rust_dec_to_u256(*amount, Some(metadata.decimals as u32))
                        .map_err(err_from!())?;
                    if token_balance < amount {
                        Ok(PlanOutcome::InsufficientFunds(format!(
                            "token balance {} below requested {}",
                            token_balance, amount
                        )))
                    } else {
                        Ok(PlanOutcome::Send(amount))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::DecimalConvExt;
    use std::str::FromStr;

    fn fee(cost_wei: u64) -> FeeEstimate {
        FeeEstimate {
            gas_price: U256::from(cost_wei),
            gas_limit: U256::from(1),
        }
    }

    fn native_balance(wei: U256) -> GetBalanceResult {
        GetBalanceResult {
            gas_balance: Some(wei),
            token_balance: None,
        }
    }

    fn token_mode(decimals: u8) -> TransferMode {
        TransferMode::Token {
            address: Address::zero(),
            metadata: TokenMetadata {
                symbol: "TST".to_string(),
                decimals,
            },
        }
    }

    #[test]
    fn test_native_sweep_reserves_fee() {
        //balance 1.000, fee cost 0.001 -> send 0.999
        let balance = native_balance(Decimal::from(1).to_u256_from_eth().unwrap());
        let fee_est = fee(1_000_000_000_000_000);
        let res = plan(
            &balance,
            &TransferMode::Native,
            &AmountPolicy::SweepAll,
            Some(&fee_est),
            false,
        )
        .unwrap();
        match res {
            PlanOutcome::Send(amount) => assert_eq!(
                amount,
                Decimal::from_str("0.999").unwrap().to_u256_from_eth().unwrap()
            ),
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn test_native_sweep_insufficient() {
        //balance 0.0005, fee cost 0.001 -> skip, nothing to send
        let balance = native_balance(
            Decimal::from_str("0.0005").unwrap().to_u256_from_eth().unwrap(),
        );
        let fee_est = fee(1_000_000_000_000_000);
        let res = plan(
            &balance,
            &TransferMode::Native,
            &AmountPolicy::SweepAll,
            Some(&fee_est),
            false,
        )
        .unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));
    }

    #[test]
    fn test_native_sweep_exact_fee_is_skip() {
        let balance = native_balance(U256::from(1000));
        let res = plan(
            &balance,
            &TransferMode::Native,
            &AmountPolicy::SweepAll,
            Some(&fee(1000)),
            false,
        )
        .unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));
    }

    #[test]
    fn test_native_fixed_requires_amount_plus_fee() {
        let amount = Decimal::from_str("0.5").unwrap();
        let policy = AmountPolicy::fixed(amount).unwrap();
        let fee_est = fee(1_000_000_000_000_000);

        //0.5005 covers 0.5 + 0.001? no -> skip
        let balance = native_balance(
            Decimal::from_str("0.5005").unwrap().to_u256_from_eth().unwrap(),
        );
        let res = plan(&balance, &TransferMode::Native, &policy, Some(&fee_est), false).unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));

        //0.501 covers exactly -> send 0.5
        let balance = native_balance(
            Decimal::from_str("0.501").unwrap().to_u256_from_eth().unwrap(),
        );
        let res = plan(&balance, &TransferMode::Native, &policy, Some(&fee_est), false).unwrap();
        match res {
            PlanOutcome::Send(sent) => {
                assert_eq!(sent, amount.to_u256_from_eth().unwrap())
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn test_token_sweep_never_subtracts_fee() {
        let balance = GetBalanceResult {
            gas_balance: None,
            token_balance: Some(U256::from(500_000_000_u64)),
        };
        let res = plan(
            &balance,
            &token_mode(6),
            &AmountPolicy::SweepAll,
            Some(&fee(1_000_000)),
            false,
        )
        .unwrap();
        match res {
            PlanOutcome::Send(amount) => assert_eq!(amount, U256::from(500_000_000_u64)),
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn test_token_fixed_scales_to_decimals() {
        //500 units of a 6 decimal token, fixed "100" -> 100 * 10^6
        let balance = GetBalanceResult {
            gas_balance: None,
            token_balance: Some(U256::from(500_000_000_u64)),
        };
        let policy = AmountPolicy::fixed(Decimal::from(100)).unwrap();
        let res = plan(&balance, &token_mode(6), &policy, None, false).unwrap();
        match res {
            PlanOutcome::Send(amount) => assert_eq!(amount, U256::from(100_000_000_u64)),
            other => panic!("expected send, got {other:?}"),
        }

        //600 requested, only 500 held -> skip
        let policy = AmountPolicy::fixed(Decimal::from(600)).unwrap();
        let res = plan(&balance, &token_mode(6), &policy, None, false).unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));
    }

    #[test]
    fn test_token_sweep_zero_balance_is_skip() {
        let balance = GetBalanceResult {
            gas_balance: None,
            token_balance: Some(U256::zero()),
        };
        let res = plan(&balance, &token_mode(18), &AmountPolicy::SweepAll, None, false).unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));
    }

    #[test]
    fn test_token_gas_headroom_option() {
        let balance = GetBalanceResult {
            gas_balance: Some(U256::from(500)),
            token_balance: Some(U256::from(1_000_000)),
        };
        //headroom off: native balance ignored
        let res = plan(
            &balance,
            &token_mode(6),
            &AmountPolicy::SweepAll,
            Some(&fee(1000)),
            false,
        )
        .unwrap();
        assert!(matches!(res, PlanOutcome::Send(_)));

        //headroom on: gas balance 500 below fee 1000 -> skip
        let res = plan(
            &balance,
            &token_mode(6),
            &AmountPolicy::SweepAll,
            Some(&fee(1000)),
            true,
        )
        .unwrap();
        assert!(matches!(res, PlanOutcome::InsufficientFunds(_)));

        //headroom on with enough gas -> send
        let res = plan(
            &balance,
            &token_mode(6),
            &AmountPolicy::SweepAll,
            Some(&fee(100)),
            true,
        )
        .unwrap();
        assert!(matches!(res, PlanOutcome::Send(_)));
    }

    #[test]
    fn test_fixed_amount_must_be_positive() {
        assert!(AmountPolicy::fixed(Decimal::ZERO).is_err());
        assert!(AmountPolicy::fixed(Decimal::from(-1)).is_err());
        assert!(AmountPolicy::fixed(Decimal::from_str("0.005").unwrap()).is_ok());
    }
}
