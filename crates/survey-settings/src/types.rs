//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON file only needs the keys it overrides.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Endpoint of the published spreadsheet web app.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbyl3rAB0Vk2ccJgL85FdABL9b64a4_KG8DWmSjG5tmP7rLfCMD-u01Q3VpdrlSzpLVLBw/exec";

/// Root settings type.
///
/// ```json
/// {
///   "gateway": { "endpointUrl": "https://example.test/exec" },
///   "display": { "utcOffset": "+05:30" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurveySettings {
    /// Remote endpoint settings.
    pub gateway: GatewaySettings,
    /// Export file settings.
    pub export: ExportSettings,
    /// Date display settings.
    pub display: DisplaySettings,
    /// Status notification settings.
    pub notification: NotificationSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl SurveySettings {
    /// Reject values that would make every gateway call or export fail.
    pub fn validate(&self) -> Result<()> {
        let url = self.gateway.endpoint_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(SettingsError::invalid(
                "gateway.endpointUrl",
                format!("must be an http(s) URL, got {url:?}"),
            ));
        }
        if self.export.spreadsheet_file_name.trim().is_empty() {
            return Err(SettingsError::invalid(
                "export.spreadsheetFileName",
                "must not be empty",
            ));
        }
        if self.export.sheet_name.trim().is_empty() || self.export.sheet_name.chars().count() > 31 {
            return Err(SettingsError::invalid(
                "export.sheetName",
                "must be 1 to 31 characters",
            ));
        }
        if self.export.document_file_prefix.trim().is_empty() {
            return Err(SettingsError::invalid(
                "export.documentFilePrefix",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Remote endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// URL for both submit (POST) and fetch (GET).
    pub endpoint_url: String,
    /// TCP/TLS connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            connect_timeout_ms: 30_000,
            user_agent: concat!("survey/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Export file settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    /// Directory the artifacts are written to.
    pub output_dir: String,
    /// File name of the spreadsheet export.
    pub spreadsheet_file_name: String,
    /// Worksheet name inside the spreadsheet.
    pub sheet_name: String,
    /// Title printed at the top of the document export.
    pub document_title: String,
    /// File name prefix of the document export; a timestamp is appended.
    pub document_file_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            spreadsheet_file_name: "SurveyData.xlsx".to_string(),
            sheet_name: "SurveyData".to_string(),
            document_title: "Government Survey Data Report".to_string(),
            document_file_prefix: "GovSurveyData".to_string(),
        }
    }
}

/// Date display settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    /// Fixed UTC offset (`+05:30`) used to read stored dates. Local offset
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

/// Status notification settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    /// How long a notification stays up before the status resets.
    pub reset_after_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            reset_after_ms: 5_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`..`error`). `RUST_LOG` wins when set.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
