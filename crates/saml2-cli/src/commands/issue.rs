//! `saml2 issue`.

use tracing::debug;

use saml2_assertion::SamlIssuer;

use crate::cli::IssueArgs;
use crate::output;
use crate::CliConfig;

/// Runs the issue command.
pub async fn run_issue(args: IssueArgs) -> crate::CliResult<()> {
    let mut config = CliConfig::load(&args.config)?;
    if let Some(claims) = args.claims.as_deref() {
        config = config.with_claims_json(claims)?;
    }
    let options = config.into_response_options()?;
    debug!(
        config = %args.config.display(),
        response = options.create_signed_saml_response,
        encrypt = options.encrypts(),
        "Issuing"
    );

    let issuance = SamlIssuer::new()?.create(&options)?;
    if !issuance.is_ready() {
        output::info("Encrypting assertion");
    }
    let xml = issuance.await?;
    output::document(&xml, args.output.as_deref())
}
