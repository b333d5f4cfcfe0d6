//! Session error types.

use survey_core::GatewayError;
use survey_export::ExportError;

/// Errors surfaced by session operations. Every one of them has already been
/// posted to the status board by the time it is returned.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Building or writing an export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// The session could not be configured.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Short classification string for logging.
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.error_kind(),
            Self::Export(e) => e.error_kind(),
            Self::Config(_) => "config",
        }
    }
}
