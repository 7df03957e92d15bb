//! `saml2 decrypt`.

use saml2_assertion::AssertionDecrypter;

use crate::cli::DecryptArgs;
use crate::config::read_pem;

use super::read_document;

/// Runs the decrypt command.
pub fn run_decrypt(args: &DecryptArgs) -> crate::CliResult<()> {
    let key = read_pem(Some(&args.key))?.unwrap_or_default();
    let xml = read_document(&args.file)?;
    let assertion = AssertionDecrypter::from_pem(&key)?.decrypt(&xml)?;
    println!("{assertion}");
    Ok(())
}
