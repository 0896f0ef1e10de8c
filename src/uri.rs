//! MongoDB connection-string parsing.
//!
//! Only the subset the dump/restore tools need is extracted: a single
//! `host:port`, optional username/password, and the database name.
//!
//! ```text
//! mongodb://[user:password@]host[:port]/database[?options]
//! ```
//!
//! Query options are accepted but ignored.  Seed lists
//! (`mongodb://a:27017,b:27017/db`) are rejected with
//! [`TransferError::UnsupportedTopology`].

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{TransferError, TransferResult};

/// Required prefix for every connection string.
pub const SCHEME: &str = "mongodb://";

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 27017;

/// Characters MongoDB does not allow in a database name.
const BAD_DB_CHARS: &[char] = &['/', '\\', ' ', '"', '$'];

// ─── Types ───────────────────────────────────────────────────────────────────

/// Username/password pair taken from the URI's user-info section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A parsed single-node connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub database: String,
}

impl ConnectionSpec {
    /// `host:port`, as passed to the tools' `-h` flag.
    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Fail with [`TransferError::InvalidInput`] unless `uri` uses `mongodb://`.
///
/// `role` (`"origin"` / `"destination"`) is carried into the error so the
/// operator knows which argument was wrong.
pub fn validate_scheme(role: &'static str, uri: &str) -> TransferResult<()> {
    if uri.starts_with(SCHEME) {
        Ok(())
    } else {
        Err(TransferError::InvalidInput { role })
    }
}

/// Parse `uri` into a [`ConnectionSpec`].
pub fn parse_connection_uri(role: &'static str, uri: &str) -> TransferResult<ConnectionSpec> {
    validate_scheme(role, uri)?;

    let (userinfo, hosts) = split_authority(&uri[SCHEME.len()..]);

    let invalid = move |reason: String| TransferError::InvalidUri { role, reason };

    if hosts.contains(',') {
        let entries: Vec<&str> = hosts.split(',').collect();
        if entries.iter().any(|h| h.is_empty()) {
            return Err(invalid("empty host (or extra comma in host list)".into()));
        }
        return Err(TransferError::UnsupportedTopology {
            role,
            hosts: entries.len(),
        });
    }

    let url = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => return Err(invalid("missing host".into())),
    };
    let port = url.port().unwrap_or(DEFAULT_PORT);

    // `Url::password()` is `None` for both `u@` and `u:@`, so the raw
    // user-info decides whether a (possibly empty) password was given.
    let credentials = match userinfo {
        None => None,
        Some(info) => {
            if info.contains('@') || info.matches(':').count() > 1 {
                return Err(invalid(
                    "username and password must be percent-encoded".into(),
                ));
            }
            let Some((user, pass)) = info.split_once(':') else {
                return Err(invalid("username given without a password".into()));
            };
            if user.is_empty() {
                return Err(invalid("password given without a username".into()));
            }
            Some(Credentials {
                username: decode(user).map_err(invalid)?,
                password: decode(pass).map_err(invalid)?,
            })
        },
    };

    // `db.collection` names the database `db`; the collection part is dropped.
    let path = decode(url.path().trim_start_matches('/')).map_err(invalid)?;
    let database = path.split_once('.').map_or(path.as_str(), |(db, _)| db);
    if database.is_empty() {
        return Err(invalid("missing database name".into()));
    }
    if let Some(c) = database.chars().find(|c| BAD_DB_CHARS.contains(c)) {
        return Err(invalid(format!("database name contains illegal character {c:?}")));
    }
    let database = database.to_string();

    Ok(ConnectionSpec {
        host,
        port,
        credentials,
        database,
    })
}

/// Split the authority into raw user-info (before the last `@`) and the
/// comma-separated host list.
fn split_authority(rest: &str) -> (Option<&str>, &str) {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    match authority.rsplit_once('@') {
        Some((info, hosts)) => (Some(info), hosts),
        None => (None, authority),
    }
}

fn decode(raw: &str) -> Result<String, String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| format!("invalid percent-encoding: {e}"))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
