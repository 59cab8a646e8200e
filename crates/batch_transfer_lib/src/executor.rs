use crate::accounts::SenderAccount;
use crate::planner::{plan, AmountPolicy, PlanOutcome, TransferMode};
use crate::transaction::ChainClient;
use crate::utils::u256_to_rust_dec;
use futures::stream::{self, StreamExt};
use std::str::FromStr;
use std::time::Duration;
use web3::types::{Address, H256, U256};

#[derive(Clone, Debug)]
pub enum TransferStatus {
    Sent(H256),
    Failed(String),
}

///Result of one (sender, recipient) attempt. Logged and counted, never persisted.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    pub recipient: String,
    pub status: TransferStatus,
}

#[derive(Clone, Debug)]
pub enum SenderStatus {
    ///All recipients were attempted, individual outcomes may still be failures
    Processed,
    ///Credential failed to parse or funds were insufficient, no attempts made
    Skipped(String),
    ///Balance or fee query failed, no attempts made
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct SenderReport {
    pub sender: String,
    pub status: SenderStatus,
    pub outcomes: Vec<TransferOutcome>,
}

///Fully resolved inputs of one run. The executor performs no prompting and
///no file I/O, everything is decided before it starts.
pub struct RunParameters {
    pub mode: TransferMode,
    pub policy: AmountPolicy,
    pub send_interval: Duration,
    pub require_gas_headroom_for_token_transfers: bool,
    ///Upper bound on concurrently processed senders. 1 keeps the legacy
    ///strictly sequential behavior. Recipients of one sender are always
    ///sequential regardless, concurrent sends from one account would race
    ///on the nonce.
    pub tasks: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

///Send the planned amount to every recipient in list order. Failures are
///recorded and the loop continues, a pacing delay separates consecutive
///attempts for the same wallet.
pub async fn execute_for_sender<C: ChainClient>(
    client: &C,
    sender: &SenderAccount,
    recipients: &[String],
    amount: U256,
    params: &RunParameters,
) -> Vec<TransferOutcome> {
    let mut outcomes = Vec::with_capacity(recipients.len());
    for (no, recipient_str) in recipients.iter().enumerate() {
        if no > 0 {
            tokio::time::sleep(params.send_interval).await;
        }
        let recipient = match Address::from_str(recipient_str) {
            Ok(recipient) => recipient,
            Err(e) => {
                log::warn!("Invalid recipient address {}: {:?}", recipient_str, e);
                outcomes.push(TransferOutcome {
                    recipient: recipient_str.clone(),
                    status: TransferStatus::Failed(format!("Invalid recipient address: {e:?}")),
                });
                continue;
            }
        };

        log::info!(
            "Sending from {:#x} to recipient {}/{}: {}",
            sender.address,
            no + 1,
            recipients.len(),
            recipient_str
        );

        let fee = match client.get_fee_estimate().await {
            Ok(fee) => fee,
            Err(e) => {
                log::warn!("Fee estimate failed before send: {}", e);
                outcomes.push(TransferOutcome {
                    recipient: recipient_str.clone(),
                    status: TransferStatus::Failed(format!("Fee estimate failed: {e}")),
                });
                continue;
            }
        };

        let status = match client
            .submit_transfer(sender, recipient, amount, &params.mode, &fee)
            .await
        {
            Ok(tx_hash) => {
                log::info!("Tx hash: {:#x}", tx_hash);
                match client.await_confirmation(tx_hash).await {
                    Ok(()) => TransferStatus::Sent(tx_hash),
                    Err(e) => {
                        log::warn!("Confirmation failed for {:#x}: {}", tx_hash, e);
                        TransferStatus::Failed(format!("Confirmation failed: {e}"))
                    }
                }
            }
            Err(e) => {
                log::warn!("Submission to {} failed: {}", recipient_str, e);
                TransferStatus::Failed(format!("Submission failed: {e}"))
            }
        };
        outcomes.push(TransferOutcome {
            recipient: recipient_str.clone(),
            status,
        });
    }
    outcomes
}

async fn process_sender<C: ChainClient>(
    client: &C,
    sender_no: usize,
    private_key: &str,
    recipients: &[String],
    params: &RunParameters,
) -> SenderReport {
    log::info!("Processing wallet {}...", sender_no + 1);
    let sender = match SenderAccount::from_private_key(private_key) {
        Ok(sender) => sender,
        Err(e) => {
            log::warn!("Wallet {} skipped: {}", sender_no + 1, e);
            return SenderReport {
                sender: format!("wallet {}", sender_no + 1),
                status: SenderStatus::Skipped(format!("Failed to parse private key: {e}")),
                outcomes: vec![],
            };
        }
    };
    let sender_addr = format!("{:#x}", sender.address);
    log::info!("Wallet {} address: {}", sender_no + 1, sender_addr);

    let check_gas = match &params.mode {
        TransferMode::Native => true,
        TransferMode::Token { .. } => params.require_gas_headroom_for_token_transfers,
    };
    let balance = match client
        .get_balance(sender.address, params.mode.token_address(), check_gas)
        .await
    {
        Ok(balance) => balance,
        Err(e) => {
            log::warn!("Balance query failed for {}: {}", sender_addr, e);
            return SenderReport {
                sender: sender_addr,
                status: SenderStatus::Failed(format!("Balance query failed: {e}")),
                outcomes: vec![],
            };
        }
    };

    let fee = match client.get_fee_estimate().await {
        Ok(fee) => fee,
        Err(e) => {
            log::warn!("Fee estimate failed for {}: {}", sender_addr, e);
            return SenderReport {
                sender: sender_addr,
                status: SenderStatus::Failed(format!("Fee estimate failed: {e}")),
                outcomes: vec![],
            };
        }
    };

    let amount = match plan(
        &balance,
        &params.mode,
        &params.policy,
        Some(&fee),
        params.require_gas_headroom_for_token_transfers,
    ) {
        Ok(PlanOutcome::Send(amount)) => amount,
        Ok(PlanOutcome::InsufficientFunds(reason)) => {
            log::warn!("Wallet {} skipped: insufficient funds, {}", sender_addr, reason);
            return SenderReport {
                sender: sender_addr,
                status: SenderStatus::Skipped(format!("Insufficient funds: {reason}")),
                outcomes: vec![],
            };
        }
        Err(e) => {
            log::warn!("Planning failed for {}: {}", sender_addr, e);
            return SenderReport {
                sender: sender_addr,
                status: SenderStatus::Failed(format!("Planning failed: {e}")),
                outcomes: vec![],
            };
        }
    };

    match u256_to_rust_dec(amount, Some(params.mode.decimals())) {
        Ok(human) => log::info!(
            "Planned amount per recipient: {} {}",
            human,
            params.mode.symbol()
        ),
        Err(_) => log::info!("Planned amount per recipient: {} smallest units", amount),
    }

    let outcomes = execute_for_sender(client, &sender, recipients, amount, params).await;
    SenderReport {
        sender: sender_addr,
        status: SenderStatus::Processed,
        outcomes,
    }
}

///Process every sender wallet against every recipient. Sender order follows
///the input list, recipient order is preserved per sender. With tasks > 1
///independent senders run concurrently, reports still come back in input
///order.
pub async fn execute_for_all_senders<C: ChainClient>(
    client: &C,
    private_keys: &[String],
    recipients: &[String],
    params: &RunParameters,
) -> Vec<SenderReport> {
    let tasks = params.tasks.max(1);
    stream::iter(private_keys.iter().enumerate())
        .map(|(sender_no, key)| process_sender(client, sender_no, key, recipients, params))
        .buffered(tasks)
        .collect::<Vec<SenderReport>>()
        .await
}

pub fn summarize(reports: &[SenderReport]) -> RunSummary {
    let mut summary = RunSummary::default();
    for report in reports {
        match &report.status {
            SenderStatus::Skipped(_) => summary.skipped += 1,
            SenderStatus::Failed(_) => summary.failed += 1,
            SenderStatus::Processed => {}
        }
        for outcome in &report.outcomes {
            match &outcome.status {
                TransferStatus::Sent(_) => summary.sent += 1,
                TransferStatus::Failed(_) => summary.failed += 1,
            }
        }
    }
    summary
}
