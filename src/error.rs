// ABOUTME: Application-wide error types for sshrun.
// ABOUTME: Uses thiserror for ergonomic error handling and maps errors to exit codes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("home directory not found: neither HOME nor USERPROFILE is set")]
    MissingHome,

    #[error("no remote user: pass --user, set `user` in the config file, or set USER")]
    MissingUser,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Ssh(#[from] crate::ssh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// A command that ran and failed passes its own status through;
    /// everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Ssh(e) => e
                .remote_exit_status()
                .map(|status| status.clamp(1, 255) as i32)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
