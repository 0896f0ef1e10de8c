//! Error kinds for the transfer pipeline.
//!
//! Every variant is terminal: nothing in the pipeline catches or retries
//! them.  Messages name the URI's *role* (`origin` / `destination`) rather
//! than echoing the URI, so credentials never end up on the terminal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("{role} must be a MongoDB URI starting with `mongodb://`")]
    InvalidInput { role: &'static str },

    #[error("could not parse the {role} URI: {reason}")]
    InvalidUri { role: &'static str, reason: String },

    #[error("the {role} URI lists {hosts} hosts; only single-host deployments are supported")]
    UnsupportedTopology { role: &'static str, hosts: usize },

    #[error("dump path {} already exists, refusing to overwrite it", path.display())]
    PathCollision { path: PathBuf },

    #[error("working directory {} is not valid UTF-8", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("{stage} failed: `{tool}` did not exit successfully")]
    ToolFailure { stage: String, tool: String },
}

pub type TransferResult<T> = Result<T, TransferError>;
