// ABOUTME: Library root for sshrun - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod output;
pub mod presets;
pub mod ssh;
