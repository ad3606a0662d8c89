// ABOUTME: Session state marker types for the type state pattern.
// ABOUTME: Each state owns exactly the resources that are valid in it.

use super::credential::Credential;
use super::session::CommandOutput;
use super::transport::Connection;
use crate::diagnostics::Diagnostics;

/// Fresh session: parameters set, buffers empty.
/// Available actions: `authenticate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Credential resolved.
/// Available actions: `connect()`, `start()`
#[derive(Debug)]
pub struct Authenticated {
    pub(crate) credential: Credential,
}

/// Transport connection established and authenticated.
/// Available actions: `open_channel()`
pub struct Connected<C> {
    pub(crate) connection: C,
}

/// Command channel open on the connection.
/// Available actions: `run()`
pub struct SessionOpen<C: Connection> {
    pub(crate) connection: C,
    pub(crate) channel: C::Channel,
}

/// Command finished with exit status 0; output buffered.
/// Available actions: `output()`, `end()`
pub struct CommandComplete<C: Connection> {
    pub(crate) connection: C,
    pub(crate) channel: C::Channel,
    pub(crate) output: CommandOutput,
}

/// Channel and connection released. Terminal state.
#[derive(Debug)]
pub struct Closed {
    pub(crate) output: CommandOutput,
    pub(crate) diagnostics: Diagnostics,
}
