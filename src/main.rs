mod options;

use crate::options::{TransferCommands, TransferToolOptions};
use batch_transfer_lib::accounts::{generate_private_keys, load_lines};
use batch_transfer_lib::balance::scan_balances;
use batch_transfer_lib::config::Config;
use batch_transfer_lib::err_custom_create;
use batch_transfer_lib::error::TransferError;
use batch_transfer_lib::eth::get_token_metadata;
use batch_transfer_lib::executor::{
    execute_for_all_senders, summarize, RunParameters, SenderStatus,
};
use batch_transfer_lib::planner::{AmountPolicy, TransferMode};
use batch_transfer_lib::transaction::Web3TransferClient;
use std::env;
use std::time::Duration;
use structopt::StructOpt;

async fn main_internal() -> Result<(), TransferError> {
    dotenv::dotenv().ok();
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info,web3=warn".to_string()),
    );

    env_logger::init();
    let cli: TransferToolOptions = TransferToolOptions::from_args();

    match cli.commands {
        TransferCommands::Run { run_options } => {
            let config = Config::load_or_env(cli.config_file.display().to_string()).await?;
            let chain = config.select_chain(&run_options.chain)?.clone();

            //everything below is validated before the first network call,
            //a bad invocation must not leave some wallets processed
            let policy = match (run_options.all, run_options.amount) {
                (true, None) => AmountPolicy::SweepAll,
                (false, Some(amount)) => AmountPolicy::fixed(amount)?,
                (true, Some(_)) => {
                    return Err(err_custom_create!(
                        "Options --all and --amount are mutually exclusive"
                    ))
                }
                (false, None) => {
                    return Err(err_custom_create!(
                        "Specify either --all or --amount <value>"
                    ))
                }
            };
            if run_options.native && run_options.token.is_some() {
                return Err(err_custom_create!(
                    "Options --native and --token are mutually exclusive"
                ));
            }
            let token_address = if run_options.native {
                None
            } else {
                run_options.token.or(chain.token)
            };

            let private_keys = load_lines(run_options.wallets_file.display().to_string())?;
            if private_keys.is_empty() {
                return Err(err_custom_create!(
                    "No wallets found in {}",
                    run_options.wallets_file.display()
                ));
            }
            let recipients = load_lines(run_options.recipients_file.display().to_string())?;
            if recipients.is_empty() {
                return Err(err_custom_create!(
                    "No recipients found in {}",
                    run_options.recipients_file.display()
                ));
            }

            let client = Web3TransferClient::connect(&chain, &config.engine).await?;

            let mode = match token_address {
                Some(address) => {
                    let metadata = get_token_metadata(client.web3(), address).await?;
                    log::info!(
                        "Sending token {} ({} decimals) at {:#x} on chain {}",
                        metadata.symbol,
                        metadata.decimals,
                        address,
                        chain.name
                    );
                    TransferMode::Token { address, metadata }
                }
                None => {
                    log::info!("Sending native coin on chain {}", chain.name);
                    TransferMode::Native
                }
            };

            log::info!(
                "Processing {} wallets x {} recipients",
                private_keys.len(),
                recipients.len()
            );
            let params = RunParameters {
                mode,
                policy,
                send_interval: Duration::from_secs(config.engine.send_interval_secs),
                require_gas_headroom_for_token_transfers: config
                    .engine
                    .require_gas_headroom_for_token_transfers,
                tasks: run_options.tasks,
            };
            let reports = execute_for_all_senders(&client, &private_keys, &recipients, &params).await;

            for report in &reports {
                match &report.status {
                    SenderStatus::Processed => {}
                    SenderStatus::Skipped(reason) => {
                        log::warn!("{}: skipped, {}", report.sender, reason)
                    }
                    SenderStatus::Failed(reason) => {
                        log::warn!("{}: failed, {}", report.sender, reason)
                    }
                }
            }
            let summary = summarize(&reports);
            log::info!(
                "Done. Sent: {}, skipped: {}, failed: {}",
                summary.sent,
                summary.skipped,
                summary.failed
            );
        }
        TransferCommands::Balance { balance_options } => {
            let config = Config::load_or_env(cli.config_file.display().to_string()).await?;
            let chain = config.select_chain(&balance_options.chain)?.clone();
            let private_keys = load_lines(balance_options.wallets_file.display().to_string())?;

            let client = Web3TransferClient::connect(&chain, &config.engine).await?;
            let token_address = balance_options.token.or(chain.token);
            let token_decimals = match token_address {
                Some(address) => Some(
                    get_token_metadata(client.web3(), address).await?.decimals as u32,
                ),
                None => None,
            };

            let balances = scan_balances(
                &client,
                &private_keys,
                token_address,
                token_decimals,
                balance_options.tasks,
            )
            .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&balances)
                    .map_err(|e| err_custom_create!("Failed to serialize balances: {}", e))?
            );
        }
        TransferCommands::GenerateKey {
            generate_key_options,
        } => {
            for (secret, address) in generate_private_keys(generate_key_options.number_of_keys) {
                println!("Private key: {}", hex::encode(secret.secret_bytes()));
                println!("Address: {:#x}", address);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), TransferError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            Err(e)
        }
    }
}
