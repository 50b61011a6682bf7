//! proof configuration file
//!
//! ```toml
//! signer_policy = "skip-unmatched"
//! min_signatures = 3
//!
//! [[layouts]]
//! from_height = 0
//! layout = "laozi"
//!
//! [[layouts]]
//! from_height = 9000000
//! layout = "v2"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use bandproof_core::{ProofConfig, SignerPolicy};

pub fn load(path: &Path) -> Result<ProofConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// File settings (or defaults) with command line overrides on top.
pub fn resolve(
    path: Option<&Path>,
    signer_policy: Option<SignerPolicy>,
    min_signatures: Option<usize>,
) -> Result<ProofConfig> {
    let mut config = match path {
        Some(path) => load(path)?,
        None => ProofConfig::default(),
    };
    if let Some(policy) = signer_policy {
        config.signer_policy = policy;
    }
    if let Some(min) = min_signatures {
        config.min_signatures = min;
    }
    Ok(config)
}
