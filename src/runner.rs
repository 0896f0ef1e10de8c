//! Command construction for the dump and restore stages.
//!
//! Nothing here executes anything; process execution lives in [`crate::ui`]
//! so that the spinner can own the terminal while a tool runs.  Every
//! function is pure and unit-testable without `mongodump` installed.
//!
//! Commands are built as explicit argument vectors and handed straight to
//! `std::process::Command`, never to a shell, so hostnames, passwords and
//! collection names are passed through verbatim.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    commands::transfer::TransferRequest,
    config::ToolsConfig,
    error::{TransferError, TransferResult},
    uri::ConnectionSpec,
};

/// Shown in place of a password when a command is echoed.
const REDACTED: &str = "****";

// ─── Dump path ────────────────────────────────────────────────────────────────

/// Staging directory for a transfer: `<work_dir>/dump_<database>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPath(PathBuf);

impl DumpPath {
    /// Fails with [`TransferError::NonUtf8Path`] when `work_dir` cannot be
    /// passed to the tools unchanged as a UTF-8 argument.
    pub fn for_database(work_dir: &Path, database: &str) -> TransferResult<Self> {
        if work_dir.to_str().is_none() {
            return Err(TransferError::NonUtf8Path {
                path: work_dir.to_path_buf(),
            });
        }
        Ok(Self(work_dir.join(format!("dump_{database}"))))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Fail with [`TransferError::PathCollision`] if the directory exists.
    pub fn ensure_free(&self) -> TransferResult<()> {
        if self.0.exists() {
            Err(TransferError::PathCollision {
                path: self.0.clone(),
            })
        } else {
            Ok(())
        }
    }

    /// What `mongorestore` should read: the whole database directory, or a
    /// single collection's `.bson` file inside it.
    pub fn restore_source(&self, origin_db: &str, collection: Option<&str>) -> PathBuf {
        let db_dir = self.0.join(origin_db);
        match collection {
            Some(c) => db_dir.join(format!("{c}.bson")),
            None => db_dir,
        }
    }
}

// ─── Tool command ─────────────────────────────────────────────────────────────

/// One fully-built external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    argv: Vec<String>,
}

impl ToolCommand {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Argument vector with the value following every `-p` masked.
    pub fn redacted(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.argv.len());
        let mut mask_next = false;
        for arg in &self.argv {
            if mask_next {
                out.push(REDACTED.to_string());
            } else {
                out.push(arg.clone());
            }
            mask_next = arg == "-p";
        }
        out
    }
}

/// Displays the redacted form, safe to print.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted().join(" "))
    }
}

// ─── Builders ─────────────────────────────────────────────────────────────────

/// `-u <user> -p <password>`, or nothing for an unauthenticated target.
fn credential_args(spec: &ConnectionSpec) -> Vec<String> {
    spec.credentials.as_ref().map_or_else(Vec::new, |c| {
        vec![
            "-u".into(),
            c.username.clone(),
            "-p".into(),
            c.password.clone(),
        ]
    })
}

fn collection_args(collection: Option<&str>) -> Vec<String> {
    collection.map_or_else(Vec::new, |c| vec!["-c".into(), c.into()])
}

/// Arguments for `mongodump` against the origin:
///
/// ```text
/// mongodump -h <host:port> [-u <user> -p <password>] -d <db> -o <dump>/ [-c <collection>]
/// ```
pub fn build_dump_command(
    tools: &ToolsConfig,
    request: &TransferRequest,
    dump_path: &DumpPath,
) -> ToolCommand {
    let origin = &request.origin;
    let mut argv = vec![tools.dump.clone(), "-h".into(), origin.host_port()];
    argv.extend(credential_args(origin));
    argv.extend([
        "-d".into(),
        origin.database.clone(),
        "-o".into(),
        format!("{}/", dump_path.as_path().display()),
    ]);
    argv.extend(collection_args(request.collection()));
    ToolCommand { argv }
}

/// Arguments for `mongorestore` against the destination:
///
/// ```text
/// mongorestore -h <host:port> -d <db> [-u <user> -p <password>] <dump>/<origin-db>[/<collection>.bson] [-c <collection>]
/// ```
pub fn build_restore_command(
    tools: &ToolsConfig,
    request: &TransferRequest,
    dump_path: &DumpPath,
) -> ToolCommand {
    let dest = &request.destination;
    let source = dump_path.restore_source(&request.origin.database, request.collection());

    let mut argv = vec![
        tools.restore.clone(),
        "-h".into(),
        dest.host_port(),
        "-d".into(),
        dest.database.clone(),
    ];
    argv.extend(credential_args(dest));
    argv.push(source.display().to_string());
    argv.extend(collection_args(request.collection()));
    ToolCommand { argv }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
