//! SAML issuance types.

mod claims;
mod constants;
mod options;

pub use claims::*;
pub use constants::*;
pub use options::*;
