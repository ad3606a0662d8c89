// ABOUTME: SSH-specific error types.
// ABOUTME: Covers credential, host key, connection, channel and execution failures.

use super::known_hosts::HostKeyRejection;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read private key {path}: {source}")]
    CredentialLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse private key {path}: {reason}")]
    CredentialParse { path: PathBuf, reason: String },

    #[error("unable to load known hosts from {path}: {source}")]
    HostKeyStoreLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("connection failed: {0}")]
    Dial(String),

    #[error("host key verification failed for {host}:{port}: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: HostKeyRejection,
    },

    #[error("authentication failed for user {user}")]
    AuthenticationFailed { user: String },

    #[error("failed to open channel: {0}")]
    ChannelOpen(String),

    #[error("command execution failed: {0}")]
    CommandExecution(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("command exited with status {status}{}", stderr_suffix(.stderr))]
    RemoteExit { status: u32, stderr: String },

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl Error {
    /// True when the error only signals that the peer already went away.
    ///
    /// Release treats these as a normal end of the session.
    pub fn is_end_of_stream(&self) -> bool {
        match self {
            Error::ChannelClosed => true,
            Error::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Error::Protocol(russh::Error::Disconnect | russh::Error::SendError) => true,
            Error::Protocol(russh::Error::IO(e)) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// Remote exit status, when the command ran and failed.
    pub fn remote_exit_status(&self) -> Option<u32> {
        match self {
            Error::RemoteExit { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
