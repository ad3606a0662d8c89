// ABOUTME: Diagnostics accumulator for non-fatal warnings during session release.
// ABOUTME: Collects close failures that shouldn't abort release but should be reported.

/// Collects non-fatal warnings raised while releasing a session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during release.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a channel close warning.
    pub fn channel_close(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ChannelClose,
            message: message.into(),
        }
    }

    /// Create a connection close warning.
    pub fn connection_close(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ConnectionClose,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Closing the command channel failed.
    ChannelClose,
    /// Closing the transport connection failed.
    ConnectionClose,
}
