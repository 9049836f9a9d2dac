//! Cross-toolchain introspection drivers.
//!
//! Section and symbol listings come from the binutils pair `readelf -S`
//! and `nm -S -l -n -f sysv`, run against the linked image with a
//! configurable toolchain prefix. The calls block with no timeout; a
//! launch failure or nonzero exit is fatal.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

/// Default cross-toolchain prefix for this platform.
pub const DEFAULT_PREFIX: &str = "arm-none-eabi-";

/// Environment variable overriding the toolchain prefix.
pub const TOOLCHAIN_ENV: &str = "ROMATLAS_TOOLCHAIN";

/// A binutils toolchain selected by name prefix.
#[derive(Debug, Clone)]
pub struct Toolchain {
    prefix: String,
}

impl Toolchain {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix from `ROMATLAS_TOOLCHAIN`, falling back to the default.
    pub fn from_env() -> Self {
        let prefix = std::env::var(TOOLCHAIN_ENV).unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
        Self::new(prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Section header listing of the image (`readelf -S`).
    pub fn section_listing(&self, image: &Path) -> ExtractResult<String> {
        self.run("readelf", &["-S"], image)
    }

    /// Address-sorted sysv symbol listing (`nm -S -l -n -f sysv`).
    pub fn symbol_listing(&self, image: &Path) -> ExtractResult<String> {
        self.run("nm", &["-S", "-l", "-n", "-f", "sysv"], image)
    }

    fn run(&self, tool: &str, args: &[&str], image: &Path) -> ExtractResult<String> {
        let program = format!("{}{}", self.prefix, tool);
        debug!(%program, image = %image.display(), "running introspection tool");
        let output = Command::new(&program)
            .args(args)
            .arg(image)
            .output()
            .map_err(|source| ExtractError::Launch {
                tool: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ExtractError::ToolFailed {
                tool: program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
