//! # survey-settings
//!
//! Configuration management with layered sources for the survey client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`SurveySettings::default()`]
//! 2. **User file**: `~/.survey/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SURVEY_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_file_layer, load_settings,
    load_settings_from_path, settings_path,
};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = SurveySettings::default();
        let _path = settings_path();
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = SurveySettings::default();
        assert!(settings.gateway.endpoint_url.starts_with("https://"));
        assert_eq!(settings.gateway.connect_timeout_ms, 30_000);
        assert_eq!(settings.export.spreadsheet_file_name, "SurveyData.xlsx");
        assert_eq!(settings.export.sheet_name, "SurveyData");
        assert_eq!(settings.export.document_file_prefix, "GovSurveyData");
        assert_eq!(settings.notification.reset_after_ms, 5_000);
        assert_eq!(settings.logging.level, "warn");
        assert!(settings.display.utc_offset.is_none());
        assert!(settings.validate().is_ok());
    }
}
