//! Terminal UI: spinners, stage lines, and captured command output.
//!
//! # Design goals
//!
//! - **Clean by default.** While a tool runs the user sees only a spinner and the stage banner. Raw
//!   `mongodump` / `mongorestore` output is captured and hidden.
//! - **Informative on failure.** If a stage exits non-zero its captured stdout *and* stderr are
//!   replayed in full so the operator can diagnose the problem without re-running by hand.
//! - **Testable without a terminal.** [`StageOutcome`] is plain data; when stderr is not a TTY the
//!   spinner draws nothing and a plain banner is printed before each stage instead.

use std::{
    process::{Command, Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of running one external tool.
#[derive(Debug)]
pub struct StageOutcome {
    /// Stage banner, e.g. `"Importing from origin"`.
    pub label: String,
    pub success: bool,
    /// Everything the tool wrote to stdout.
    pub stdout: String,
    /// Everything the tool wrote to stderr.
    pub stderr: String,
    /// Spawn error or non-zero exit description, if any.
    pub error: Option<String>,
}

impl StageOutcome {
    /// Print the one-line summary (✓/✗ + label) to stdout.
    ///
    /// On failure, also replays the captured output and the error message
    /// to stderr.
    pub fn print(&self) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
            return;
        }

        println!("  {}  {}", icon_err(), style(&self.label).bold());

        if let Some(ref msg) = self.error {
            eprintln!();
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }
        if !self.stdout.is_empty() {
            eprintln!();
            eprintln!("  {} stdout:", style("►").dim());
            for line in self.stdout.lines() {
                eprintln!("    {line}");
            }
        }
        if !self.stderr.is_empty() {
            eprintln!();
            eprintln!("  {} stderr:", style("►").dim());
            for line in self.stderr.lines() {
                eprintln!("    {line}");
            }
        }
    }

    pub const fn failed(&self) -> bool {
        !self.success
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Whether the spinner can be drawn.  indicatif draws on stderr and hides
/// itself when stderr is not a terminal.
pub fn spinner_visible() -> bool {
    console::user_attended_stderr()
}

/// Plain stage banner, printed before a tool starts when no spinner shows.
pub fn print_banner(label: &str) {
    println!("  {}  {}", style("►").cyan(), style(label).bold());
}

fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(s) = ProgressStyle::with_template("  {spinner:.cyan}  {msg}") {
        pb.set_style(s.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run `args[0]` with the remaining arguments, capturing stdout and stderr,
/// and block until it exits.
///
/// No shell is involved.  There is no timeout.
///
/// Returns `(success, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String]) -> Result<(bool, String, String)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn `{prog}`"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run one tool behind a spinner, returning a [`StageOutcome`].
///
/// The spinner is cleared before returning so the caller's outcome line
/// lands on a clean terminal.
pub fn run_stage(label: &str, args: &[String]) -> StageOutcome {
    let spinner = make_spinner(label);

    let result = run_captured(args);
    spinner.finish_and_clear();

    let program = args.first().map_or("", String::as_str);
    match result {
        Ok((true, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: true,
            stdout,
            stderr,
            error: None,
        },
        Ok((false, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout,
            stderr,
            error: Some(format!("`{program}` exited non-zero")),
        },
        Err(e) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(format!("{e:#}")),
        },
    }
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// Print one generated command line.
pub fn print_command(cmd: &str) {
    println!("{}", style(cmd).dim());
}

/// Print the final completion line.
pub fn print_done() {
    println!();
    println!("  {} {}", icon_done(), style("Done!").cyan().bold());
}

/// Print the failure banner listing every failed stage.
pub fn print_failed(outcomes: &[StageOutcome]) {
    eprintln!();
    eprintln!("  {}  {}", icon_err(), style("Transfer failed.").red().bold());
    for o in outcomes.iter().filter(|o| o.failed()) {
        eprintln!("    {} {}", icon_err(), style(&o.label).red());
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
