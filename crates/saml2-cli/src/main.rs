//! # saml2
//!
//! Issues, verifies and decrypts SAML 2.0 assertions.

#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saml2_cli::{
    cli::{Cli, Command},
    commands::{run_decrypt, run_issue, run_verify},
    output::error,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the documents.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Issue(args) => run_issue(args).await,
        Command::Verify(args) => run_verify(&args),
        Command::Decrypt(args) => run_decrypt(&args),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
