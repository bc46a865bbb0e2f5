//! Compiler trait and the `solc` process driver

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use solts_common::{Error, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::description::{InputDescription, OutputDescription};

/// Turns a standard-JSON request into a standard-JSON response
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, input: &InputDescription) -> Result<OutputDescription>;
}

/// Runs a local `solc` binary in standard-JSON mode
#[derive(Debug, Clone)]
pub struct Solc {
    binary: PathBuf,
    base_path: Option<PathBuf>,
}

impl Default for Solc {
    fn default() -> Self {
        Self::new("solc")
    }
}

impl Solc {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self { binary: binary.into(), base_path: None }
    }

    /// Root that relative imports resolve against
    pub fn with_base_path<P: Into<PathBuf>>(mut self, base_path: P) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("--standard-json");
        if let Some(base_path) = &self.base_path {
            command.arg("--base-path").arg(base_path);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

#[async_trait]
impl Compiler for Solc {
    async fn compile(&self, input: &InputDescription) -> Result<OutputDescription> {
        let request = serde_json::to_vec(input)?;
        debug!(binary = %self.binary.display(), sources = input.sources.len(), "running compiler");

        let mut child = self.command().spawn().map_err(|e| {
            Error::compiler(format!("failed to start '{}': {}", self.binary.display(), e))
        })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(Error::compiler(format!(
                "'{}' exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::compiler(format!("unreadable compiler output: {}", e)))
    }
}
