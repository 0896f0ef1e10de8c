//! Configuration types and loading logic.
//!
//! Configuration is entirely optional: with no file present the tool runs
//! `mongodump` / `mongorestore` from `PATH` and aborts on the first failed
//! stage.
//!
//! Two files are layered (see [`crate::load_merged_config`]):
//!
//! 1. `~/.config/mongotransf/config.toml`: global defaults
//! 2. `./mongotransf.toml` (or `--config <path>`): per-directory overrides
//!
//! # File format
//!
//! ```toml
//! [tools]
//! dump    = "/opt/mongodb-tools/bin/mongodump"
//! restore = "/opt/mongodb-tools/bin/mongorestore"
//!
//! [transfer]
//! ignore_tool_status = false   # true = always report "Done!"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Resolved configuration, after merging every layer.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Programs invoked for each stage.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Pipeline behaviour.
    #[serde(default)]
    pub transfer: TransferConfig,
}

// ─── [tools] ──────────────────────────────────────────────────────────────────

/// Which executables to run.  Bare names are resolved through `PATH`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    #[serde(default = "default_dump_tool")]
    pub dump: String,

    #[serde(default = "default_restore_tool")]
    pub restore: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dump: default_dump_tool(),
            restore: default_restore_tool(),
        }
    }
}

// ─── [transfer] ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Keep going (and report success) even when a tool exits non-zero.
    ///
    /// Off by default.  Both stages always run when set, and `Done!` is
    /// printed whatever the tools' exit codes were.
    #[serde(default)]
    pub ignore_tool_status: bool,
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

pub fn default_dump_tool() -> String {
    "mongodump".into()
}

pub fn default_restore_tool() -> String {
    "mongorestore".into()
}

// ─── Partial (layered) config ─────────────────────────────────────────────────

/// One configuration layer, with every field optional so that an absent key
/// can be told apart from a key set to its default value.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PartialConfig {
    #[serde(default)]
    pub tools: PartialTools,
    #[serde(default)]
    pub transfer: PartialTransfer,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PartialTools {
    pub dump: Option<String>,
    pub restore: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PartialTransfer {
    pub ignore_tool_status: Option<bool>,
}

impl PartialConfig {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            tools: PartialTools {
                dump: other.tools.dump.or(self.tools.dump),
                restore: other.tools.restore.or(self.tools.restore),
            },
            transfer: PartialTransfer {
                ignore_tool_status: other
                    .transfer
                    .ignore_tool_status
                    .or(self.transfer.ignore_tool_status),
            },
        }
    }

    /// Fill every unset field with its default.
    pub fn resolve(self) -> Config {
        Config {
            tools: ToolsConfig {
                dump: self.tools.dump.unwrap_or_else(default_dump_tool),
                restore: self.tools.restore.unwrap_or_else(default_restore_tool),
            },
            transfer: TransferConfig {
                ignore_tool_status: self.transfer.ignore_tool_status.unwrap_or(false),
            },
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read one configuration layer from `path`.
///
/// Returns `Ok(None)` when the file does not exist, and an error when it
/// exists but cannot be read or is not valid TOML.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
