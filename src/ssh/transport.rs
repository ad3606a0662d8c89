// ABOUTME: Transport traits separating the session lifecycle from the SSH library.
// ABOUTME: Defines Transport (dial), Connection (open/close) and CommandChannel (exec/close).

use super::credential::Credential;
use super::error::Result;
use super::known_hosts::KnownHosts;
use super::session::SessionConfig;
use async_trait::async_trait;

/// Dials authenticated connections.
#[async_trait]
pub trait Transport: Send + Sync {
    type Connection: Connection;

    /// Connect to `config.host:config.port`, verify the host key against
    /// `known_hosts` and authenticate as `config.user`.
    async fn dial(
        &self,
        config: &SessionConfig,
        credential: &Credential,
        known_hosts: &KnownHosts,
    ) -> Result<Self::Connection>;
}

/// An established, authenticated transport connection.
#[async_trait]
pub trait Connection: Send {
    type Channel: CommandChannel;

    async fn open_channel(&mut self) -> Result<Self::Channel>;

    async fn close(self) -> Result<()>;
}

/// A single command channel multiplexed over a connection.
#[async_trait]
pub trait CommandChannel: Send {
    /// Run `command`, appending remote stdout and stderr to the buffers.
    ///
    /// Returns the remote exit status once the command has completed.
    async fn exec(
        &mut self,
        command: &str,
        stdout: &mut Vec<u8>,
        stderr: &mut Vec<u8>,
    ) -> Result<u32>;

    async fn close(self) -> Result<()>;
}
