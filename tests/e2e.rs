//! End-to-end tests for the full dump → restore pipeline.
//!
//! The real `mongodump` / `mongorestore` are replaced by small shell scripts
//! (configured through `mongotransf.toml`) that append their argv to a log
//! file.  The fake dump also creates its `-o` directory, as the real tool
//! does, so the dump-directory side effect can be checked.
//!
//! Unix only: the fakes are `#!/bin/sh` scripts.
//!
//! # Running
//!
//! ```sh
//! cargo test --test e2e
//! ```

#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Command,
};

const BIN: &str = env!("CARGO_BIN_EXE_mongotransf");

const ORIGIN: &str = "mongodb://u1:s3cr3t-origin@a:27017/foo";
const DESTINATION: &str = "mongodb://u2:s3cr3t-dest@b:27017/bar";

// ─── Fixture ──────────────────────────────────────────────────────────────────

/// An isolated working directory with fake tools wired in via config.
struct Fixture {
    /// Root temp dir; deleted on drop.
    _root: tempfile::TempDir,
    /// Working directory `mongotransf` runs in.
    work_dir: PathBuf,
    /// Every fake tool invocation is appended here, one line each.
    log: PathBuf,
}

impl Fixture {
    /// `dump_exit` / `restore_exit` are the fakes' exit codes.
    fn new(dump_exit: i32, restore_exit: i32) -> Self {
        let root = tempfile::tempdir().unwrap();
        let work_dir = root.path().join("work");
        let bin_dir = root.path().join("bin");
        fs::create_dir_all(&work_dir).unwrap();
        fs::create_dir_all(&bin_dir).unwrap();

        let log = root.path().join("calls.log");

        let dump = bin_dir.join("fake-mongodump");
        write_script(
            &dump,
            &format!(
                r#"#!/bin/sh
echo "dump $*" >> "{log}"
while [ $# -gt 0 ]; do
    if [ "$1" = "-o" ]; then mkdir -p "$2"; fi
    shift
done
exit {dump_exit}
"#,
                log = log.display()
            ),
        );

        let restore = bin_dir.join("fake-mongorestore");
        write_script(
            &restore,
            &format!(
                r#"#!/bin/sh
echo "restore $*" >> "{log}"
echo "restore says hi"
exit {restore_exit}
"#,
                log = log.display()
            ),
        );

        fs::write(
            work_dir.join("mongotransf.toml"),
            format!(
                "[tools]\ndump    = \"{}\"\nrestore = \"{}\"\n",
                dump.display(),
                restore.display()
            ),
        )
        .unwrap();

        Self {
            _root: root,
            work_dir,
            log,
        }
    }

    fn run(&self, args: &[&str]) -> (bool, String, String) {
        let out = Command::new(BIN)
            .args(args)
            .current_dir(&self.work_dir)
            .env("XDG_CONFIG_HOME", self.work_dir.join(".config"))
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));

        (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
        )
    }

    /// Logged invocations, in order.
    fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    fn dump_dir(&self) -> PathBuf {
        self.work_dir.join("dump_foo")
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn non_blank(stdout: &str) -> Vec<&str> {
    stdout.lines().filter(|l| !l.trim().is_empty()).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

/// Whole-database transfer: two commands, two banners, one completion line.
#[test]
fn whole_database_transfer_reports_done() {
    let fx = Fixture::new(0, 0);

    let (ok, stdout, stderr) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(ok, "transfer should succeed; stderr:\n{stderr}");

    let lines = non_blank(&stdout);
    assert_eq!(lines.len(), 5, "stdout:\n{stdout}");
    assert!(lines[0].contains("fake-mongodump -h a:27017 -u u1 -p **** -d foo -o "));
    assert!(lines[1].contains("fake-mongorestore -h b:27017 -d bar -u u2 -p **** "));
    assert!(lines[1].ends_with("dump_foo/foo"));
    assert!(lines[2].contains("Importing from origin"));
    assert!(lines[3].contains("Exporting to destination"));
    assert!(lines[4].contains("Done!"));

    assert!(fx.dump_dir().is_dir(), "dump stage should create dump_foo");
}

/// The restore must only start once the dump process has exited.
#[test]
fn dump_runs_before_restore() {
    let fx = Fixture::new(0, 0);
    let (ok, _, stderr) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(ok, "stderr:\n{stderr}");

    let calls = fx.calls();
    assert_eq!(calls.len(), 2, "calls: {calls:?}");
    assert!(calls[0].starts_with("dump "));
    assert!(calls[1].starts_with("restore "));
}

/// The real password reaches the tools even though it is masked on screen.
#[test]
fn tools_receive_unredacted_arguments() {
    let fx = Fixture::new(0, 0);
    let (ok, stdout, _) = fx.run(&[ORIGIN, DESTINATION, "users"]);
    assert!(ok);
    assert!(!stdout.contains("s3cr3t"));

    let calls = fx.calls();
    assert!(calls[0].contains("-p s3cr3t-origin"));
    assert!(calls[0].ends_with("-c users"));
    assert!(calls[1].contains("-p s3cr3t-dest"));
    assert!(calls[1].contains("dump_foo/foo/users.bson -c users"));
}

/// A failing dump aborts before the restore and exits non-zero.
#[test]
fn failed_dump_skips_restore() {
    let fx = Fixture::new(1, 0);

    let (ok, stdout, stderr) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(!ok);
    assert!(!stdout.contains("Done!"));
    assert!(stderr.contains("Transfer failed"), "stderr:\n{stderr}");

    let calls = fx.calls();
    assert_eq!(calls.len(), 1, "restore must not run: {calls:?}");
}

/// With stderr captured there is no spinner, so each banner is printed once,
/// before its tool runs.
#[test]
fn unattended_banners_precede_each_stage() {
    let fx = Fixture::new(0, 0);
    let (ok, stdout, _) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(ok);
    assert_eq!(stdout.matches("Importing from origin").count(), 1);
    assert_eq!(stdout.matches("Exporting to destination").count(), 1);

    let fx = Fixture::new(2, 0);
    let (ok, stdout, _) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(!ok);
    let lines = non_blank(&stdout);
    assert_eq!(lines.len(), 4, "stdout:\n{stdout}");
    assert!(lines[2].contains("►") && lines[2].contains("Importing from origin"));
    assert!(lines[3].contains("✗") && lines[3].contains("Importing from origin"));
}

/// A failing restore replays its captured output and exits non-zero.
#[test]
fn failed_restore_replays_output() {
    let fx = Fixture::new(0, 4);

    let (ok, _, stderr) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(!ok);
    assert!(stderr.contains("restore says hi"), "stderr:\n{stderr}");
    assert!(stderr.contains("Exporting to destination failed"));

    assert!(fx.dump_dir().is_dir(), "the dump directory is left in place");
}

/// `--ignore-tool-status` reproduces the legacy "always Done!" behaviour.
#[test]
fn ignore_tool_status_always_reports_done() {
    let fx = Fixture::new(1, 1);

    let (ok, stdout, _) = fx.run(&["--ignore-tool-status", ORIGIN, DESTINATION]);
    assert!(ok);
    assert!(stdout.contains("Done!"));
    assert_eq!(fx.calls().len(), 2);
}

/// A second run refuses to clobber the first run's dump.
#[test]
fn second_run_hits_path_collision() {
    let fx = Fixture::new(0, 0);

    let (ok, _, _) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(ok);

    let (ok, stdout, stderr) = fx.run(&[ORIGIN, DESTINATION]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("already exists"));
    assert_eq!(fx.calls().len(), 2, "no tool should run the second time");
}
