use crate::error::*;
use crate::eth::get_eth_addr_from_secret;
use crate::{err_custom_create, err_from_msg};
use rand::RngCore;
use secp256k1::SecretKey;
use std::path::Path;
use std::str::FromStr;
use web3::types::Address;

///One wallet allowed to send outbound transfers. Scoped to a single
///processing loop, never cached between runs.
pub struct SenderAccount {
    pub secret: SecretKey,
    pub address: Address,
}

impl SenderAccount {
    pub fn from_private_key(key: &str) -> Result<Self, TransferError> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        //do not disclose the private key in error message
        let secret = SecretKey::from_str(key)
            .map_err(|_| err_custom_create!("Failed to parse private key"))?;
        let address = get_eth_addr_from_secret(&secret);
        Ok(SenderAccount { secret, address })
    }
}

///Read a newline-delimited input file, trimming entries and dropping blanks.
///A missing file is a fatal startup error.
pub fn load_lines<P: AsRef<Path> + std::fmt::Display>(
    path: P,
) -> Result<Vec<String>, TransferError> {
    let content =
        std::fs::read_to_string(&path).map_err(err_from_msg!("Missing input file {}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn generate_private_keys(count: usize) -> Vec<(SecretKey, Address)> {
    let mut rng = rand::thread_rng();
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        //from_slice rejects zero and out of range scalars, just draw again
        if let Ok(secret) = SecretKey::from_slice(&bytes) {
            let address = get_eth_addr_from_secret(&secret);
            keys.push((secret, address));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_lines_trims_and_drops_blanks() {
        let path = std::env::temp_dir().join("batch_transfer_test_recipients.txt");
        std::fs::write(
            &path,
            "  0x7e5f4552091a69125d5dfcb7b8c2659029395bdf  \n\n0x2b5ad5c4795c026514f8317c7a215e218dccd6cf\n   \n",
        )
        .unwrap();
        let lines = load_lines(path.display().to_string()).unwrap();
        assert_eq!(
            lines,
            vec![
                "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".to_string(),
                "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf".to_string(),
            ]
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_lines_missing_file() {
        let res = load_lines("no_such_file_for_sure.txt");
        assert!(res.is_err());
    }

    #[test]
    fn test_sender_account_from_private_key() {
        let account = SenderAccount::from_private_key(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            format!("{:#x}", account.address),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );

        //0x prefix accepted as well
        let account = SenderAccount::from_private_key(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            format!("{:#x}", account.address),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );

        assert!(SenderAccount::from_private_key("not a key").is_err());
        assert!(SenderAccount::from_private_key("").is_err());
    }

    #[test]
    fn test_generate_private_keys() {
        let keys = generate_private_keys(3);
        assert_eq!(keys.len(), 3);
        for (secret, address) in &keys {
            assert_eq!(get_eth_addr_from_secret(secret), *address);
        }
    }
}
