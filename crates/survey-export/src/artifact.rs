//! In-memory export results.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::errors::ExportError;

/// A finished export: file name plus content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, without directory.
    pub file_name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, creating the directory if needed.
    /// Returns the full path written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ExportError::Io { path, source }
        };
        std::fs::create_dir_all(dir).map_err(io_err(dir))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(io_err(&path))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "export written");
        Ok(path)
    }
}

/// `YYYYMMDD-HHMMSS`, the stamp embedded in document file names.
pub fn export_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn timestamp_is_zero_padded() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap();
        assert_eq!(export_timestamp(at), "20240307-090502");
    }

    #[test]
    fn write_to_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports").join("today");
        let artifact = ExportArtifact {
            file_name: "out.bin".into(),
            bytes: vec![1, 2, 3],
        };
        let path = artifact.write_to(&target).unwrap();
        assert_eq!(path, target.join("out.bin"));
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn write_to_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let artifact = ExportArtifact {
            file_name: "out.bin".into(),
            bytes: Vec::new(),
        };
        let err = artifact.write_to(&blocker).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
