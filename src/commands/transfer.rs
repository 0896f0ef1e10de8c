//! The transfer pipeline.
//!
//! # Stages (in order)
//!
//! | # | Stage              | Fails with                                   |
//! |---|--------------------|----------------------------------------------|
//! | 1 | Validate schemes   | `InvalidInput`                               |
//! | 2 | Parse URIs         | `InvalidUri`, `UnsupportedTopology`          |
//! | 3 | Check dump path    | `PathCollision`                              |
//! | 4 | Build commands     | (pure)                                       |
//! | 5 | Dump, then restore | `ToolFailure` unless `--ignore-tool-status`  |
//! | 6 | Report             | (prints `Done!`)                             |
//!
//! Stages 1–3 run before any process is started.  The restore is launched
//! only after the dump process has exited, since it reads the directory the
//! dump just wrote.  The dump directory is never removed.

use std::path::Path;

use crate::{
    config::ToolsConfig,
    error::{TransferError, TransferResult},
    runner::{DumpPath, ToolCommand, build_dump_command, build_restore_command},
    ui::{self, StageOutcome},
    uri::{ConnectionSpec, parse_connection_uri, validate_scheme},
};

pub const DUMP_BANNER: &str = "Importing from origin";
pub const RESTORE_BANNER: &str = "Exporting to destination";

// ─── Request ──────────────────────────────────────────────────────────────────

/// Everything needed to describe one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub origin: ConnectionSpec,
    pub destination: ConnectionSpec,
    collection: Option<String>,
}

impl TransferRequest {
    /// Validate both schemes, then parse both URIs.
    ///
    /// An empty or blank `collection` means "the whole database".
    pub fn from_uris(
        origin: &str,
        destination: &str,
        collection: Option<&str>,
    ) -> TransferResult<Self> {
        validate_scheme("origin", origin)?;
        validate_scheme("destination", destination)?;

        Ok(Self {
            origin: parse_connection_uri("origin", origin)?,
            destination: parse_connection_uri("destination", destination)?,
            collection: collection
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        })
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Resolved knobs from the config file and CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub tools: ToolsConfig,
    /// Run both stages and report success whatever the tools' exit codes.
    pub ignore_tool_status: bool,
    /// Print the commands and stop.
    pub dry_run: bool,
}

// ─── Process seam ─────────────────────────────────────────────────────────────

/// Executes one stage and blocks until its process has exited.
pub trait StageRunner {
    fn run_stage(&mut self, label: &str, command: &ToolCommand) -> StageOutcome;
}

/// Runs the real tools behind a terminal spinner.
pub struct TerminalRunner;

impl StageRunner for TerminalRunner {
    fn run_stage(&mut self, label: &str, command: &ToolCommand) -> StageOutcome {
        ui::run_stage(label, command.argv())
    }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Run the dump → restore pipeline for `request`, staging under `work_dir`.
pub fn transfer(
    request: &TransferRequest,
    settings: &Settings,
    work_dir: &Path,
    runner: &mut dyn StageRunner,
) -> TransferResult<()> {
    let dump_path = DumpPath::for_database(work_dir, &request.origin.database)?;
    dump_path.ensure_free()?;

    let dump = build_dump_command(&settings.tools, request, &dump_path);
    let restore = build_restore_command(&settings.tools, request, &dump_path);

    ui::print_command(&dump.to_string());
    ui::print_command(&restore.to_string());

    if settings.dry_run {
        return Ok(());
    }

    let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(2);

    // Without a visible spinner the banner goes out before the tool starts,
    // and only failures get a second line.
    let live = ui::spinner_visible();

    for (label, command) in [(DUMP_BANNER, &dump), (RESTORE_BANNER, &restore)] {
        if !live {
            ui::print_banner(label);
        }
        let outcome = runner.run_stage(label, command);
        if live || outcome.failed() {
            outcome.print();
        }
        let failed = outcome.failed();
        outcomes.push(outcome);

        if failed && !settings.ignore_tool_status {
            ui::print_failed(&outcomes);
            return Err(TransferError::ToolFailure {
                stage: label.to_string(),
                tool: command.program().to_string(),
            });
        }
    }

    ui::print_done();
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
