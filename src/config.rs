/// Configuration for the solts command line
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solts_codegen::{CodegenConfig, OverloadPolicy};
use solts_compiler::Solc;

/// Settings read from a config file, then the environment, then flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoltsConfig {
    /// Compiler binary
    pub solc: String,

    /// Root for resolving imports
    pub base_path: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Code generation settings
    pub codegen: CodegenConfig,
}

impl Default for SoltsConfig {
    fn default() -> Self {
        Self {
            solc: "solc".to_string(),
            base_path: None,
            log_level: "info".to_string(),
            codegen: CodegenConfig::default(),
        }
    }
}

impl SoltsConfig {
    /// Load from an optional file and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML or JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML configuration file: {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON configuration file: {}", path.display()))?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported configuration file format. Supported formats: .toml, .json"
                ))
            }
        };
        Ok(config)
    }

    /// Apply `SOLTS_*` environment variable overrides
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(solc) = lookup("SOLTS_SOLC") {
            self.solc = solc;
        }
        if let Some(base_path) = lookup("SOLTS_BASE_PATH") {
            self.base_path = Some(PathBuf::from(base_path));
        }
        if let Some(log_level) = lookup("SOLTS_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(policy) = lookup("SOLTS_OVERLOAD_POLICY") {
            self.codegen.overload_policy = policy
                .parse::<OverloadPolicy>()
                .with_context(|| "Invalid SOLTS_OVERLOAD_POLICY value")?;
        }
        Ok(())
    }

    /// Compiler driver for these settings
    pub fn compiler(&self) -> Solc {
        let solc = Solc::new(&self.solc);
        match &self.base_path {
            Some(base_path) => solc.with_base_path(base_path),
            None => solc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SoltsConfig::default();
        assert_eq!(config.solc, "solc");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.codegen.overload_policy, OverloadPolicy::Combine);
        assert!(config.codegen.emit_links);
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solts.toml");
        fs::write(
            &path,
            "solc = \"/opt/solc-0.8.24\"\nbase_path = \"contracts\"\n\n[codegen]\noverload_policy = \"mangle\"\n",
        )
        .unwrap();

        let config = SoltsConfig::load_from_file(&path).unwrap();
        assert_eq!(config.solc, "/opt/solc-0.8.24");
        assert_eq!(config.base_path, Some(PathBuf::from("contracts")));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.codegen.overload_policy, OverloadPolicy::Mangle);
        assert!(config.codegen.emit_links);
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solts.json");
        fs::write(&path, r#"{"log_level": "debug", "codegen": {"emit_links": false}}"#).unwrap();

        let config = SoltsConfig::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.codegen.emit_links);
        assert_eq!(config.codegen.overload_policy, OverloadPolicy::Combine);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solts.yaml");
        fs::write(&path, "solc: solc").unwrap();
        assert!(SoltsConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SOLTS_SOLC", "/usr/local/bin/solc"),
            ("SOLTS_BASE_PATH", "/src"),
            ("SOLTS_OVERLOAD_POLICY", "mangle"),
        ]);
        let mut config = SoltsConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.solc, "/usr/local/bin/solc");
        assert_eq!(config.base_path, Some(PathBuf::from("/src")));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.codegen.overload_policy, OverloadPolicy::Mangle);
    }

    #[test]
    fn test_invalid_policy_override() {
        let mut config = SoltsConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "SOLTS_OVERLOAD_POLICY").then(|| "widen".to_string())
        });
        assert!(result.is_err());
    }
}
