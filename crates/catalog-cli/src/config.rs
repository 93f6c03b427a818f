//! Resolves the `StoreConfig` the commands run against.
//!
//! Precedence: CLI flags and `CATALOG_*` flag variables, then the selected
//! profile, then `[defaults]`.

use catalog_config::Config;
use catalog_core::{StoreConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `StoreConfig` from the config file, profile, and CLI overrides.
pub fn store_config(cfg: &Config, global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let (profile_name, mut profile) = cfg.resolve_profile(global.profile.as_deref())?;
    tracing::debug!(profile = %profile_name, "resolved profile");

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let mut store = cfg.to_store_config(&profile)?;
    if global.insecure {
        store.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(store)
}
