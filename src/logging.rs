// ABOUTME: Tracing subscriber setup driven by an explicit verbosity setting.
// ABOUTME: Diagnostics go to stderr so captured remote output stays clean on stdout.

use tracing_subscriber::EnvFilter;

/// How much diagnostic logging to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    #[default]
    Quiet,
    /// Connection and session progress.
    Verbose,
}

impl Verbosity {
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Verbose => "sshrun=debug,russh=info",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `verbosity` when set.
pub fn init(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
