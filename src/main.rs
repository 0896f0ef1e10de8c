//! `mongotransf` copies one MongoDB database into another.
//!
//! # Overview
//!
//! A thin orchestration layer around the MongoDB database tools: it parses
//! two connection URIs, dumps the origin database to `./dump_<db>` with
//! `mongodump`, then loads that dump into the destination with
//! `mongorestore`.
//!
//! # Usage
//!
//! ```text
//! mongotransf mongodb://u:p@a:27017/foo mongodb://u:p@b:27017/bar          # whole database
//! mongotransf mongodb://u:p@a:27017/foo mongodb://u:p@b:27017/bar users    # one collection
//! mongotransf --dry-run …        # print the commands, run nothing
//! mongotransf --print-config     # show merged config and exit
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | Layered `Config` + TOML loader              |
//! | [`error`]                | `TransferError` kinds                       |
//! | [`uri`]                  | Connection-string parsing                   |
//! | [`runner`]               | Dump/restore argument construction          |
//! | [`ui`]                   | Spinner, captured execution, stage output   |
//! | [`commands::transfer`]   | The dump → restore pipeline                 |

mod cli;
mod commands;
mod config;
mod error;
mod runner;
mod ui;
mod uri;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use commands::transfer::{Settings, TerminalRunner, TransferRequest, transfer};
use config::{PartialConfig, parse_partial};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_merged_config(&cli.config)?;

    if cli.print_config {
        println!("{cfg:#?}");
        return Ok(());
    }

    let origin = cli.origin.as_deref().context("missing origin URI")?;
    let destination = cli
        .destination
        .as_deref()
        .context("missing destination URI")?;

    let request = TransferRequest::from_uris(origin, destination, cli.collection.as_deref())?;

    let settings = Settings {
        tools: cfg.tools,
        ignore_tool_status: cli.ignore_tool_status || cfg.transfer.ignore_tool_status,
        dry_run: cli.dry_run,
    };

    let work_dir = std::env::current_dir().context("reading the current directory")?;
    transfer(&request, &settings, &work_dir, &mut TerminalRunner)?;

    Ok(())
}

/// Load configuration from two sources and merge them.
///
/// 1. `~/.config/mongotransf/config.toml`: global defaults
/// 2. `local_path` (default: `./mongotransf.toml`): per-directory overrides
///
/// Local values win on a per-field basis.  Either file may be absent.  A
/// broken global file is reported and skipped; a broken local file is an
/// error.
fn load_merged_config(local_path: &std::path::Path) -> Result<config::Config> {
    let global_path = dirs_next::config_dir().map(|d| d.join("mongotransf").join("config.toml"));

    let global: PartialConfig = match global_path.as_deref().map(parse_partial) {
        Some(Ok(Some(p))) => p,
        Some(Err(e)) => {
            eprintln!("Warning: ignoring global config: {e:#}");
            PartialConfig::default()
        },
        _ => PartialConfig::default(),
    };

    let local = parse_partial(local_path)?.unwrap_or_default();

    Ok(global.merge(local).resolve())
}
