//! CLI configuration.
//!
//! An issuance configuration is a TOML file holding [`ResponseOptions`]
//! plus paths to the PEM files they need. Relative paths resolve against
//! the directory of the configuration file.
//!
//! ```toml
//! issuer = "urn:idp"
//! lifetime_in_seconds = 600
//! audiences = "urn:sp"
//! key_path = "idp.key"
//! cert_path = "idp.pem"
//!
//! create_signed_saml_response = true
//! destination = "https://sp.example.com/acs"
//!
//! [attributes]
//! email = "foo@bar.com"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use saml2_assertion::{ClaimSet, ResponseOptions};

/// Issuance configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Issuance options. Inline PEM values are replaced by the files below.
    #[serde(flatten)]
    pub options: ResponseOptions,

    /// Signing key file.
    #[serde(default)]
    pub key_path: Option<PathBuf>,

    /// Signing certificate file.
    #[serde(default)]
    pub cert_path: Option<PathBuf>,

    /// Recipient public key file.
    #[serde(default)]
    pub encryption_public_key_path: Option<PathBuf>,

    /// Recipient certificate file. Enables encryption.
    #[serde(default)]
    pub encryption_cert_path: Option<PathBuf>,
}

impl CliConfig {
    /// Loads configuration from file.
    pub fn load(path: &Path) -> crate::CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Makes relative PEM paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.key_path,
            &mut self.cert_path,
            &mut self.encryption_public_key_path,
            &mut self.encryption_cert_path,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Replaces the configured claims with a JSON object.
    pub fn with_claims_json(mut self, json: &str) -> crate::CliResult<Self> {
        let claims: ClaimSet = serde_json::from_str(json)?;
        self.options.assertion.attributes = Some(claims);
        Ok(self)
    }

    /// Reads the referenced PEM files into the options.
    pub fn into_response_options(self) -> crate::CliResult<ResponseOptions> {
        let mut options = self.options;
        if let Some(pem) = read_pem(self.key_path.as_deref())? {
            options.assertion.key = Some(pem);
        }
        if let Some(pem) = read_pem(self.cert_path.as_deref())? {
            options.assertion.cert = Some(pem);
        }
        if let Some(pem) = read_pem(self.encryption_public_key_path.as_deref())? {
            options.encryption_public_key = Some(pem);
        }
        if let Some(pem) = read_pem(self.encryption_cert_path.as_deref())? {
            options.encryption_cert = Some(pem);
        }
        Ok(options)
    }
}

/// Reads a PEM file, if a path is configured.
pub fn read_pem(path: Option<&Path>) -> crate::CliResult<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path).map_err(|e| {
            crate::CliError::Config(format!("failed to read {}: {e}", path.display()))
        })
    })
    .transpose()
}
