//! `saml2 verify`.

use saml2_assertion::XmlSignatureValidator;

use crate::cli::VerifyArgs;
use crate::config::read_pem;
use crate::output::{success, warning};

use super::read_document;

/// Runs the verify command.
pub fn run_verify(args: &VerifyArgs) -> crate::CliResult<()> {
    let xml = read_document(&args.file)?;
    let validator = match read_pem(args.cert.as_deref())? {
        Some(cert) => XmlSignatureValidator::from_pem(&[cert.as_str()])?,
        None => {
            warning("No trusted certificate given; trusting the embedded certificates");
            XmlSignatureValidator::new()
        }
    }
    .allow_sha1(args.allow_sha1);

    for reference in validator.validate(&xml)? {
        success(&format!(
            "{} #{} ({}, {})",
            reference.element,
            reference.id,
            reference.signature_algorithm.name(),
            reference.digest_algorithm.name(),
        ));
    }
    Ok(())
}
