use std::path::PathBuf;

use structopt::StructOpt;
use web3::types::Address;

#[derive(StructOpt)]
#[structopt(about = "Batch transfer tool - run options")]
pub struct RunOptions {
    #[structopt(
        short = "c",
        long = "chain",
        help = "Chain name or 1-based position in the config"
    )]
    pub chain: String,

    #[structopt(
        long = "token",
        help = "ERC20 contract address, overrides the token from the chain config"
    )]
    pub token: Option<Address>,

    #[structopt(
        long = "native",
        help = "Send the native coin even if the chain has a token configured"
    )]
    pub native: bool,

    #[structopt(long = "all", help = "Sweep the full available balance of every wallet")]
    pub all: bool,

    #[structopt(
        short = "a",
        long = "amount",
        help = "Amount per recipient (decimal, full precision, i.e. 0.01)"
    )]
    pub amount: Option<rust_decimal::Decimal>,

    #[structopt(
        long = "wallets-file",
        help = "File with sender private keys, one per line",
        default_value = "wallets.txt"
    )]
    pub wallets_file: PathBuf,

    #[structopt(
        long = "recipients-file",
        help = "File with recipient addresses, one per line",
        default_value = "recipients.txt"
    )]
    pub recipients_file: PathBuf,

    #[structopt(
        long = "tasks",
        help = "Number of wallets processed concurrently",
        default_value = "1"
    )]
    pub tasks: usize,
}

#[derive(StructOpt)]
#[structopt(about = "Wallet balance options")]
pub struct BalanceOptions {
    #[structopt(
        short = "c",
        long = "chain",
        help = "Chain name or 1-based position in the config"
    )]
    pub chain: String,

    #[structopt(long = "token", help = "ERC20 contract address to also report")]
    pub token: Option<Address>,

    #[structopt(
        long = "wallets-file",
        help = "File with sender private keys, one per line",
        default_value = "wallets.txt"
    )]
    pub wallets_file: PathBuf,

    #[structopt(long = "tasks", default_value = "4")]
    pub tasks: usize,
}

#[derive(StructOpt)]
#[structopt(about = "Generate private key options")]
pub struct GenerateKeyOptions {
    #[structopt(short = "n", long = "number-of-keys", default_value = "5")]
    pub number_of_keys: usize,
}

#[derive(StructOpt)]
pub enum TransferCommands {
    #[structopt(about = "Send transfers from every wallet to every recipient")]
    Run {
        #[structopt(flatten)]
        run_options: RunOptions,
    },
    #[structopt(about = "Print balances of the sender wallets")]
    Balance {
        #[structopt(flatten)]
        balance_options: BalanceOptions,
    },
    GenerateKey {
        #[structopt(flatten)]
        generate_key_options: GenerateKeyOptions,
    },
}

#[derive(StructOpt)]
#[structopt(about = "Batch transfer tool")]
pub struct TransferToolOptions {
    #[structopt(
        long = "config-file",
        help = "Chain and engine configuration",
        default_value = "config-transfers.toml"
    )]
    pub config_file: PathBuf,

    #[structopt(subcommand)]
    pub commands: TransferCommands,
}
