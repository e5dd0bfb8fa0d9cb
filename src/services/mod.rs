//! Wrappers around the remote resource groups of the API
//!
//! Each service borrows an authenticated [`ApiClient`](crate::http::ApiClient)
//! and, for asynchronous operations, waits on the resulting transaction
//! under a progress spinner.

pub mod cdfmc;
pub mod command_line;
pub mod inventory;
pub mod msp;
pub mod token;
pub mod upgrade;

pub use cdfmc::CdFmcApiService;
pub use command_line::CliApiService;
pub use inventory::InventoryApiService;
pub use msp::MspApiService;
pub use token::TokenValidationService;
pub use upgrade::DeviceUpgradeApiService;
