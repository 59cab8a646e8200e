pub mod accounts;
pub mod balance;
pub mod config;
pub mod contracts;
pub mod error;
pub mod eth;
pub mod executor;
pub mod planner;
pub mod transaction;
pub mod utils;
