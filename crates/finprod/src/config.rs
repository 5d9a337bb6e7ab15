//! CLI configuration -- thin wrapper around `finprod_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--base-url, --insecure, etc.).

use std::time::Duration;

use clap::ValueEnum;

use finprod_core::{ControllerConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use finprod_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config
        .active_profile_name(global.profile.as_deref())
        .unwrap_or_else(|| "default".into())
}

/// Fill unset output/color/timeout flags from the config defaults.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&defaults.color, true).ok();
    }
    if global.timeout.is_none() {
        global.timeout = Some(defaults.timeout);
    }
}

/// Translate the active profile + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values. Without any
/// profile the built-in default endpoint is used.
pub fn resolve_controller_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ControllerConfig, CliError> {
    let profile = config.resolve_profile(global.profile.as_deref())?;
    let mut resolved = finprod_config::profile_to_controller_config(profile, &config.defaults)?;

    // 1. Base URL (flag > env > profile)
    if let Some(ref raw) = global.base_url {
        resolved.base_url = finprod_config::parse_base_url(raw)?;
    }

    // 2. TLS verification
    if global.insecure {
        resolved.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Timeout
    if let Some(secs) = global.timeout {
        resolved.timeout = Duration::from_secs(secs);
    }

    // One request-response cycle per invocation.
    resolved.refresh_interval_secs = 0;
    Ok(resolved)
}

/// Page size for `products list`: flag > profile > defaults.
pub fn page_size(
    global: &GlobalOpts,
    config: &Config,
    flag: Option<usize>,
) -> Result<usize, CliError> {
    if let Some(size) = flag {
        return Ok(size);
    }
    let profile = config.resolve_profile(global.profile.as_deref())?;
    Ok(finprod_config::page_size_for(profile, &config.defaults)?)
}
