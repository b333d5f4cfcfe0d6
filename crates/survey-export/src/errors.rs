//! Export error types.

use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;

/// Errors from building or writing an export artifact.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The filtered record list is empty; nothing is produced.
    #[error("No data to export!")]
    NoData,
    /// The workbook writer failed.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] XlsxError),
    /// The data does not fit the target format.
    #[error("export too large: {0}")]
    Overflow(String),
    /// Writing the artifact to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Short classification string for logging.
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::NoData => "no_data",
            Self::Spreadsheet(_) => "spreadsheet",
            Self::Overflow(_) => "overflow",
            Self::Io { .. } => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_message_is_user_facing() {
        assert_eq!(ExportError::NoData.to_string(), "No data to export!");
        assert_eq!(ExportError::NoData.error_kind(), "no_data");
    }

    #[test]
    fn io_error_names_path() {
        let err = ExportError::Io {
            path: PathBuf::from("/nowhere/SurveyData.xlsx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nowhere/SurveyData.xlsx"));
        assert_eq!(err.error_kind(), "io");
    }
}
