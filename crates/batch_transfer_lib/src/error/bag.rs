use super::{CustomError, TransactionFailedError};
use crate::utils::ConversionError;
use rustc_hex::FromHexError;
use std::fmt::Display;

/// Enum containing all possible errors used in the library
#[derive(Debug)]
pub enum ErrorBag {
    IoError(std::io::Error),
    CustomError(CustomError),
    TransactionFailedError(TransactionFailedError),
    EthAbiError(web3::ethabi::Error),
    Web3Error(web3::Error),
    ConversionError(ConversionError),
    FromHexError(FromHexError),
}

impl Display for ErrorBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorBag::IoError(io_error) => write!(f, "{io_error}"),
            ErrorBag::CustomError(custom_error) => write!(f, "{custom_error}"),
            ErrorBag::TransactionFailedError(transaction_failed_error) => {
                write!(f, "{transaction_failed_error}")
            }
            ErrorBag::EthAbiError(eth_abi_error) => write!(f, "{eth_abi_error:?}"),
            ErrorBag::Web3Error(web3_error) => write!(f, "{web3_error:?}"),
            ErrorBag::ConversionError(conversion_error) => write!(f, "{conversion_error:?}"),
            ErrorBag::FromHexError(from_hex_error) => write!(f, "{from_hex_error:?}"),
        }
    }
}

impl std::error::Error for ErrorBag {}

impl From<std::io::Error> for ErrorBag {
    fn from(err: std::io::Error) -> Self {
        ErrorBag::IoError(err)
    }
}

impl From<CustomError> for ErrorBag {
    fn from(err: CustomError) -> Self {
        ErrorBag::CustomError(err)
    }
}

impl From<TransactionFailedError> for ErrorBag {
    fn from(err: TransactionFailedError) -> Self {
        ErrorBag::TransactionFailedError(err)
    }
}

impl From<web3::ethabi::Error> for ErrorBag {
    fn from(err: web3::ethabi::Error) -> Self {
        ErrorBag::EthAbiError(err)
    }
}

impl From<web3::Error> for ErrorBag {
    fn from(err: web3::Error) -> Self {
        ErrorBag::Web3Error(err)
    }
}

impl From<ConversionError> for ErrorBag {
    fn from(err: ConversionError) -> Self {
        ErrorBag::ConversionError(err)
    }
}

impl From<FromHexError> for ErrorBag {
    fn from(err: FromHexError) -> Self {
        ErrorBag::FromHexError(err)
    }
}
