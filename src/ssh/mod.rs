// ABOUTME: SSH module for running one command on a remote host.
// ABOUTME: Password or key authentication, strict known_hosts verification, buffered output.

mod client;
mod credential;
mod error;
mod known_hosts;
mod session;
mod state;
mod transport;

pub use client::{RusshChannel, RusshConnection, RusshTransport};
pub use credential::{
    Credential, CredentialResolver, CredentialSource, FsKeyReader, KeyReader, Password,
};
pub use error::{Error, Result};
pub use known_hosts::{HostKeyRejection, KnownHosts};
pub use session::{CommandOutput, Session, SessionConfig, execute};
pub use state::{Authenticated, Closed, CommandComplete, Connected, Created, SessionOpen};
pub use transport::{CommandChannel, Connection, Transport};
