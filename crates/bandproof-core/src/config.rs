//! proof assembly configuration

use std::fmt;
use std::str::FromStr;

use bandproof_merkle::LayoutSchedule;
use serde::{Deserialize, Serialize};

use crate::error::ProofError;

/// What to do with a signature whose signer cannot be recovered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignerPolicy {
    /// fail the whole request
    #[default]
    Strict,
    /// drop it, report it, and carry on if enough signatures remain
    SkipUnmatched,
}

impl fmt::Display for SignerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignerPolicy::Strict => "strict",
            SignerPolicy::SkipUnmatched => "skip-unmatched",
        })
    }
}

impl FromStr for SignerPolicy {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(SignerPolicy::Strict),
            "skip-unmatched" | "skip" => Ok(SignerPolicy::SkipUnmatched),
            other => Err(ProofError::malformed(format!("unknown signer policy: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    pub signer_policy: SignerPolicy,
    /// fewest recovered signatures a relay proof may carry
    pub min_signatures: usize,
    pub layouts: LayoutSchedule,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            signer_policy: SignerPolicy::Strict,
            min_signatures: 1,
            layouts: LayoutSchedule::default(),
        }
    }
}

impl ProofConfig {
    pub fn with_signer_policy(mut self, policy: SignerPolicy) -> Self {
        self.signer_policy = policy;
        self
    }

    pub fn with_min_signatures(mut self, min: usize) -> Self {
        self.min_signatures = min;
        self
    }

    pub fn with_layouts(mut self, layouts: LayoutSchedule) -> Self {
        self.layouts = layouts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandproof_merkle::LayoutVersion;

    #[test]
    fn test_defaults() {
        let config = ProofConfig::default();
        assert_eq!(config.signer_policy, SignerPolicy::Strict);
        assert_eq!(config.min_signatures, 1);
        assert_eq!(
            config.layouts.layout_at(1).unwrap().version,
            LayoutVersion::Laozi
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ProofConfig = serde_json::from_str(
            r#"{
                "signer_policy": "skip-unmatched",
                "layouts": [
                    { "from_height": 0, "layout": "laozi" },
                    { "from_height": 1000, "layout": "v2" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.signer_policy, SignerPolicy::SkipUnmatched);
        assert_eq!(config.min_signatures, 1);
        assert_eq!(config.layouts.layout_at(999).unwrap().version, LayoutVersion::Laozi);
        assert_eq!(config.layouts.layout_at(1000).unwrap().version, LayoutVersion::V2);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("strict".parse::<SignerPolicy>().unwrap(), SignerPolicy::Strict);
        assert_eq!(
            "skip-unmatched".parse::<SignerPolicy>().unwrap(),
            SignerPolicy::SkipUnmatched
        );
        assert!("lenient".parse::<SignerPolicy>().is_err());
        assert_eq!(SignerPolicy::SkipUnmatched.to_string(), "skip-unmatched");
    }
}
