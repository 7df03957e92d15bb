//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// saml2 - SAML 2.0 assertion issuance and verification.
#[derive(Debug, Parser)]
#[command(name = "saml2")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Issue an assertion or Response.
    Issue(IssueArgs),

    /// Verify every signature in a document.
    Verify(VerifyArgs),

    /// Decrypt an encrypted assertion.
    Decrypt(DecryptArgs),
}

/// Arguments for `issue`.
#[derive(Debug, Args)]
pub struct IssueArgs {
    /// Issuance configuration (TOML).
    #[arg(short, long, env = "SAML2_CONFIG")]
    pub config: PathBuf,

    /// Claims as a JSON object, replacing those in the configuration.
    #[arg(long)]
    pub claims: Option<String>,

    /// Write the document to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `verify`.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Trusted signing certificate (PEM). Without it the embedded
    /// certificates are used.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Accept SHA-1 signatures and digests.
    #[arg(long)]
    pub allow_sha1: bool,

    /// Document to verify.
    pub file: PathBuf,
}

/// Arguments for `decrypt`.
#[derive(Debug, Args)]
pub struct DecryptArgs {
    /// Recipient private key (PEM).
    #[arg(short, long)]
    pub key: PathBuf,

    /// EncryptedAssertion, or a Response carrying one.
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verify() {
        let cli = Cli::parse_from(["saml2", "verify", "--cert", "idp.pem", "--allow-sha1", "doc.xml"]);
        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.cert, Some(PathBuf::from("idp.pem")));
                assert!(args.allow_sha1);
                assert_eq!(args.file, PathBuf::from("doc.xml"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["saml2", "decrypt", "-k", "sp.key", "doc.xml", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Decrypt(_)));
    }
}
