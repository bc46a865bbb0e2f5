//! Generation settings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solts_common::Error;

/// How functions sharing a name are exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverloadPolicy {
    /// One member per overload, named after its input parameters
    Mangle,
    /// One member per name, dispatching on the supplied arguments
    #[default]
    Combine,
}

impl fmt::Display for OverloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverloadPolicy::Mangle => write!(f, "mangle"),
            OverloadPolicy::Combine => write!(f, "combine"),
        }
    }
}

impl FromStr for OverloadPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mangle" => Ok(OverloadPolicy::Mangle),
            "combine" => Ok(OverloadPolicy::Combine),
            other => Err(Error::config(format!(
                "unknown overload policy '{}', expected 'mangle' or 'combine'",
                other
            ))),
        }
    }
}

/// Configuration for contract code generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub overload_policy: OverloadPolicy,
    /// Emit a `Links` table for contracts with library placeholders
    pub emit_links: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            overload_policy: OverloadPolicy::default(),
            emit_links: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("mangle".parse::<OverloadPolicy>().unwrap(), OverloadPolicy::Mangle);
        assert_eq!("Combine".parse::<OverloadPolicy>().unwrap(), OverloadPolicy::Combine);
        assert!("union".parse::<OverloadPolicy>().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CodegenConfig = serde_json::from_str(r#"{"overload_policy": "mangle"}"#).unwrap();
        assert_eq!(config.overload_policy, OverloadPolicy::Mangle);
        assert!(config.emit_links);
    }
}
