use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::error::*;
use crate::{err_custom_create, err_from, err_from_msg};
use tokio::fs;
use web3::types::Address;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Engine {
    ///Pacing delay between consecutive sends from the same wallet
    #[serde(default = "default_send_interval_secs")]
    pub send_interval_secs: u64,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_confirmation_poll_secs")]
    pub confirmation_poll_secs: u64,
    ///When sweeping tokens also check that the wallet holds enough native
    ///balance to pay for one transfer's gas. Off matches the legacy scripts.
    #[serde(default)]
    pub require_gas_headroom_for_token_transfers: bool,
}

fn default_send_interval_secs() -> u64 {
    3
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

fn default_confirmation_poll_secs() -> u64 {
    5
}

impl Default for Engine {
    fn default() -> Self {
        Engine {
            send_interval_secs: default_send_interval_secs(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            confirmation_poll_secs: default_confirmation_poll_secs(),
            require_gas_headroom_for_token_transfers: false,
        }
    }
}

//chains are kept in declaration order, selection by 1-based index relies on it
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub name: String,
    pub rpc_url: String,
    pub token: Option<Address>,
    pub chain_id: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub chain: Vec<Chain>,
    #[serde(default)]
    pub engine: Engine,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, TransferError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, TransferError> {
        match toml::from_str(&fs::read_to_string(&path).await.map_err(err_from!())?) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }

    ///Chain list from positional env variables, the format used by the legacy
    ///scripts: CHAIN_1_NAME, CHAIN_1_URL, CHAIN_1_TOKEN, CHAIN_2_NAME, ...
    ///Enumeration stops at the first index missing a name/url pair.
    pub fn from_env() -> Result<Self, TransferError> {
        let mut chains = Vec::new();
        for i in 1.. {
            let (Ok(name), Ok(rpc_url)) = (
                env::var(format!("CHAIN_{i}_NAME")),
                env::var(format!("CHAIN_{i}_URL")),
            ) else {
                break;
            };
            let token = match env::var(format!("CHAIN_{i}_TOKEN")) {
                Ok(token) => Some(Address::from_str(token.trim()).map_err(err_from_msg!(
                    "Invalid token address in CHAIN_{i}_TOKEN"
                ))?),
                Err(_) => None,
            };
            let chain_id = match env::var(format!("CHAIN_{i}_ID")) {
                Ok(id) => Some(u64::from_str(id.trim()).map_err(|e| {
                    err_custom_create!("Invalid chain id in CHAIN_{}_ID: {}", i, e)
                })?),
                Err(_) => None,
            };
            chains.push(Chain {
                name,
                rpc_url,
                token,
                chain_id,
            });
        }
        Ok(Config {
            chain: chains,
            engine: Engine::default(),
        })
    }

    ///Load the toml config if present, otherwise fall back to env enumeration
    pub async fn load_or_env<P: AsRef<Path> + std::fmt::Display>(
        path: P,
    ) -> Result<Self, TransferError> {
        if path.as_ref().exists() {
            Self::load(path).await
        } else {
            log::debug!("Config file {} not found, reading chains from env", path);
            Self::from_env()
        }
    }

    ///Resolve a chain by name or 1-based list position
    pub fn select_chain(&self, selector: &str) -> Result<&Chain, TransferError> {
        if self.chain.is_empty() {
            return Err(err_custom_create!("No chains configured"));
        }
        if let Ok(idx) = usize::from_str(selector) {
            return self
                .chain
                .get(idx.wrapping_sub(1))
                .ok_or(err_custom_create!(
                    "Chain number {} out of range 1..{}",
                    selector,
                    self.chain.len()
                ));
        }
        self.chain
            .iter()
            .find(|c| c.name == selector)
            .ok_or(err_custom_create!("Chain {} not found in config", selector))
    }
}
