// ABOUTME: Command handlers for the sshrun CLI.
// ABOUTME: Re-exports the exec handler that runs one remote command.

mod exec;

pub use exec::exec_command;
