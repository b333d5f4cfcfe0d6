//! Workbook export.
//!
//! The sheet is a plain dump of the records: one header row holding every
//! key seen across the records, then one row per record with each cell
//! written in its stored type.

use rust_xlsxwriter::{Workbook, Worksheet};
use survey_core::{FieldValue, SurveyRecord};
use survey_settings::ExportSettings;

use crate::artifact::ExportArtifact;
use crate::errors::ExportError;

/// Union of populated keys across `records`, in first-seen order. Each
/// record contributes its keys in the order the gateway sent them.
pub fn header_keys(records: &[&SurveyRecord]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for (key, _) in record.fields_in_source_order() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Build the `.xlsx` workbook for `records`.
pub fn export_spreadsheet(
    records: &[&SurveyRecord],
    settings: &ExportSettings,
) -> Result<ExportArtifact, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let keys = header_keys(records);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let _ = sheet.set_name(&settings.sheet_name)?;

    for (col, key) in keys.iter().enumerate() {
        let _ = sheet.write_string(0, column(col)?, key)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| ExportError::Overflow(format!("{} rows", records.len())))?;
        for (col, key) in keys.iter().enumerate() {
            if let Some(value) = record.value(key) {
                write_cell(sheet, row, column(col)?, &value)?;
            }
        }
    }

    let _ = sheet.autofit();
    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(
        rows = records.len(),
        columns = keys.len(),
        bytes = bytes.len(),
        "spreadsheet built"
    );

    Ok(ExportArtifact {
        file_name: settings.spreadsheet_file_name.clone(),
        bytes,
    })
}

fn column(index: usize) -> Result<u16, ExportError> {
    u16::try_from(index).map_err(|_| ExportError::Overflow(format!("{} columns", index + 1)))
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &FieldValue,
) -> Result<(), ExportError> {
    match value {
        FieldValue::Text(s) => {
            let _ = sheet.write_string(row, col, s)?;
        }
        FieldValue::Number(n) => match n.as_f64() {
            Some(f) => {
                let _ = sheet.write_number(row, col, f)?;
            }
            None => {
                let _ = sheet.write_string(row, col, n.to_string())?;
            }
        },
        FieldValue::Flag(b) => {
            let _ = sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}
