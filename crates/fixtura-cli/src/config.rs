//! Target configuration shared by all commands.
//!
//! Every environment/target value is injected via flags or environment
//! variables. Credentials and endpoints are never hard-coded anywhere
//! in this tooling.

use clap::Args;

use fixtura_api::Credentials;

/// API target and credentials.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Base URL of the invoicing API.
    #[arg(long, env = "FIXTURA_API_BASE")]
    pub api_base: String,

    /// Merchant/tenant identifier sent on every authenticated call.
    #[arg(long, env = "FIXTURA_MERCHANT_ID")]
    pub merchant_id: String,

    /// Login email.
    #[arg(long, env = "FIXTURA_EMAIL")]
    pub email: String,

    /// Login password.
    #[arg(long, env = "FIXTURA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl TargetArgs {
    /// Bundle the credential fields for the lifecycle layer.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
            merchant_id: self.merchant_id.clone(),
        }
    }
}
