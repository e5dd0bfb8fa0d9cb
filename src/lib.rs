// scc-toolkit: tenant and device lifecycle tooling for Security Cloud Control
// Exposes the workflows and API services behind the `scc` binary as a library

pub mod cli;
pub mod commands;
pub mod config;
pub mod http;
pub mod models;
pub mod output;
pub mod parsers;
pub mod progress;
pub mod prompt;
pub mod retry;
pub mod services;
pub mod transaction;
pub mod validation;
