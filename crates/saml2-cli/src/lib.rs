//! # saml2-cli
//!
//! Command-line front end for `saml2-assertion`.
//!
//! This crate provides:
//! - Assertion and Response issuance from a TOML configuration
//! - Signature verification of issued documents
//! - Decryption of encrypted assertions

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
