//! Projection of records into the details table.

use std::fmt::Write as _;

use crate::dates::Calendar;
use crate::record::SurveyRecord;

/// Columns shown in the details table, in display order.
pub const TABLE_COLUMNS: [&str; 10] = [
    "SNo", "GaliNo", "HouseNo", "Name", "Relation", "DOB", "Age", "AadharNo", "PhoneNo", "Married",
];

/// Placeholder for a record without a birth date.
pub const MISSING_DOB: &str = "N/A";

/// One table row, already converted to display text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    /// Cells aligned with [`TABLE_COLUMNS`].
    pub cells: Vec<String>,
}

impl DisplayRow {
    /// Project a record. Absent fields become empty cells; the DOB is shown
    /// as `DD/MM/YYYY` when it parses, raw when it does not, and `N/A` when
    /// it is missing or blank.
    pub fn from_record(record: &SurveyRecord, calendar: &Calendar) -> Self {
        let cells = TABLE_COLUMNS
            .iter()
            .map(|key| {
                if *key == "DOB" {
                    display_dob(record, calendar)
                } else {
                    record.text(key)
                }
            })
            .collect();
        Self { cells }
    }
}

fn display_dob(record: &SurveyRecord, calendar: &Calendar) -> String {
    let Some(value) = record.dob.as_ref() else {
        return MISSING_DOB.to_string();
    };
    let raw = value.as_text();
    if raw.trim().is_empty() {
        return MISSING_DOB.to_string();
    }
    calendar
        .display_date(&raw)
        .unwrap_or_else(|| raw.into_owned())
}

/// State of the details table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableView {
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed.
    Failed,
    /// Loaded, but nothing to show.
    Empty,
    /// Rows to display.
    Rows(Vec<DisplayRow>),
}

impl TableView {
    /// Build the view for a (possibly filtered) record list.
    pub fn from_records(records: &[&SurveyRecord], calendar: &Calendar) -> Self {
        if records.is_empty() {
            return Self::Empty;
        }
        Self::Rows(
            records
                .iter()
                .map(|r| DisplayRow::from_record(r, calendar))
                .collect(),
        )
    }

    /// Status line shown in place of rows, if any.
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading data..."),
            Self::Failed => Some("Failed to load data."),
            Self::Empty => Some("No data found."),
            Self::Rows(_) => None,
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            _ => 0,
        }
    }

    /// Render as a padded plain-text table.
    pub fn render_text(&self) -> String {
        let Self::Rows(rows) = self else {
            return self.message().unwrap_or_default().to_string();
        };

        let mut widths: Vec<usize> = TABLE_COLUMNS.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = TABLE_COLUMNS.iter().map(|h| (*h).to_string()).collect();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in rows {
            push_line(&mut out, &row.cells, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(" | ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
