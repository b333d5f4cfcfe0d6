//! Paginated PDF report.
//!
//! The report is a title block followed by a grid table with a fixed
//! twenty-column header. Text is set in the standard Helvetica faces, so no
//! font program is embedded.

#![allow(unused_results)]

use chrono::NaiveDateTime;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use survey_core::{Calendar, SurveyRecord};
use survey_settings::ExportSettings;

use crate::artifact::{ExportArtifact, export_timestamp};
use crate::errors::ExportError;
use crate::fonts::{Face, encode_win_ansi};
use crate::layout::{LaidOutRow, MM, PageSpec, TableLayout, layout_table};

/// Report columns, in print order.
pub const DOCUMENT_COLUMNS: [&str; 20] = [
    "SNo",
    "GaliNo",
    "HouseNo",
    "Name",
    "Relation",
    "DOB",
    "Age",
    "Education",
    "Caste",
    "AadharNo",
    "PhoneNo",
    "RationCard",
    "Married",
    "FamilyPlanning",
    "Occupation",
    "Disabled",
    "Nasha",
    "Mediclaim",
    "Diseases",
    "Owner",
];

const TITLE_SIZE: f32 = 16.0;
const HEADER_FILL: (f32, f32, f32) = (0.0, 86.0 / 255.0, 179.0 / 255.0);
const HEADER_TEXT: (f32, f32, f32) = (1.0, 1.0, 1.0);
const BODY_TEXT: (f32, f32, f32) = (0.08, 0.08, 0.08);
const GRID_LINE: (f32, f32, f32) = (0.78, 0.78, 0.78);

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

/// Project records onto [`DOCUMENT_COLUMNS`]. DOB is reformatted to
/// `DD/MM/YYYY` when it parses; absent fields are empty.
pub fn document_rows(records: &[&SurveyRecord], calendar: &Calendar) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            DOCUMENT_COLUMNS
                .iter()
                .map(|key| {
                    let text = record.text(key);
                    if *key == "DOB" && !text.is_empty() {
                        calendar.display_date(&text).unwrap_or(text)
                    } else {
                        text
                    }
                })
                .collect()
        })
        .collect()
}

/// Build the PDF report for `records`. The file name carries the
/// `generated_at` stamp.
pub fn export_document(
    records: &[&SurveyRecord],
    calendar: &Calendar,
    generated_at: NaiveDateTime,
    settings: &ExportSettings,
) -> Result<ExportArtifact, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let stamp = export_timestamp(generated_at);
    let paper = PageSpec::a4_landscape();
    let rows = document_rows(records, calendar);
    let layout = layout_table(&DOCUMENT_COLUMNS, &rows, &paper);
    let subtitle = format!("Generated on: {stamp}");
    let bytes = render(&layout, &paper, &settings.document_title, &subtitle)?;

    tracing::debug!(
        rows = records.len(),
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "document built"
    );

    Ok(ExportArtifact {
        file_name: format!("{}_{stamp}.pdf", settings.document_file_prefix),
        bytes,
    })
}

fn render(
    layout: &TableLayout,
    paper: &PageSpec,
    title: &str,
    subtitle: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let info_id = alloc.bump();
    let page_ids: Vec<(Ref, Ref)> = layout
        .pages
        .iter()
        .map(|_| (alloc.bump(), alloc.bump()))
        .collect();
    let page_count = i32::try_from(page_ids.len())
        .map_err(|_| ExportError::Overflow(format!("{} pages", page_ids.len())))?;

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_count);
    pdf.type1_font(regular_id)
        .base_font(Name(Face::Regular.base_font()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(Face::Bold.base_font()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("survey ", env!("CARGO_PKG_VERSION"))));

    for (index, (range, (page_id, content_id))) in layout.pages.iter().zip(&page_ids).enumerate() {
        let mut content = Content::new();
        let mut top = if index == 0 {
            draw_text(&mut content, REGULAR, TITLE_SIZE, paper.margin, 15.0 * MM, title, paper);
            draw_text(&mut content, REGULAR, TITLE_SIZE, paper.margin, 22.0 * MM, subtitle, paper);
            paper.first_table_top
        } else {
            paper.margin
        };

        draw_row(&mut content, &layout.header, &layout.widths, top, paper, RowStyle::HEADER);
        top += layout.header.height;
        for row in &layout.rows[range.clone()] {
            draw_row(&mut content, row, &layout.widths, top, paper, RowStyle::BODY);
            top += row.height;
        }

        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, paper.width, paper.height))
            .parent(tree_id)
            .contents(*content_id);
        page.resources()
            .fonts()
            .pair(REGULAR, regular_id)
            .pair(BOLD, bold_id);
        page.finish();

        pdf.stream(*content_id, &content.finish());
    }

    Ok(pdf.finish())
}

#[derive(Clone, Copy)]
struct RowStyle {
    font: Name<'static>,
    fill: Option<(f32, f32, f32)>,
    text: (f32, f32, f32),
}

impl RowStyle {
    const HEADER: Self = Self {
        font: BOLD,
        fill: Some(HEADER_FILL),
        text: HEADER_TEXT,
    };
    const BODY: Self = Self {
        font: REGULAR,
        fill: None,
        text: BODY_TEXT,
    };
}

/// Draw one row whose top edge is `top` points below the page top.
#[allow(clippy::cast_precision_loss)]
fn draw_row(
    content: &mut Content,
    row: &LaidOutRow,
    widths: &[f32],
    top: f32,
    paper: &PageSpec,
    style: RowStyle,
) {
    let size = paper.font_size;
    let bottom = paper.height - top - row.height;
    let mut x = paper.margin;

    for (lines, &width) in row.cells.iter().zip(widths) {
        if let Some((r, g, b)) = style.fill {
            content.set_fill_rgb(r, g, b);
            content.rect(x, bottom, width, row.height);
            content.fill_nonzero();
        }
        let (r, g, b) = GRID_LINE;
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(0.1 * MM);
        content.rect(x, bottom, width, row.height);
        content.stroke();

        let (r, g, b) = style.text;
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = paper.height
                - (top + paper.cell_padding + i as f32 * paper.line_height() + size * 0.85);
            content.begin_text();
            content.set_font(style.font, size);
            content.set_fill_rgb(r, g, b);
            content.next_line(x + paper.cell_padding, baseline);
            content.show(Str(&encode_win_ansi(line)));
            content.end_text();
        }
        x += width;
    }
}

/// Draw a single line with its baseline `baseline_from_top` below the page top.
fn draw_text(
    content: &mut Content,
    font: Name<'_>,
    size: f32,
    x: f32,
    baseline_from_top: f32,
    text: &str,
    paper: &PageSpec,
) {
    content.begin_text();
    content.set_font(font, size);
    content.set_fill_rgb(0.0, 0.0, 0.0);
    content.next_line(x, paper.height - baseline_from_top);
    content.show(Str(&encode_win_ansi(text)));
    content.end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use serde_json::json;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap()
    }

    fn record(value: serde_json::Value) -> SurveyRecord {
        serde_json::from_value(value).unwrap()
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn page_count(pdf: &[u8]) -> usize {
        count(pdf, b"/Type /Page") - count(pdf, b"/Type /Pages")
    }

    #[test]
    fn rows_follow_fixed_columns() {
        let r = record(json!({
            "Owner": "Yes", "SNo": 4, "Name": "Asha", "DOB": "1990-05-11", "Ward": "ignored"
        }));
        let rows = document_rows(&[&r], &Calendar::utc());
        assert_eq!(rows[0].len(), 20);
        assert_eq!(rows[0][0], "4");
        assert_eq!(rows[0][3], "Asha");
        assert_eq!(rows[0][5], "11/05/1990");
        assert_eq!(rows[0][7], "");
        assert_eq!(rows[0][19], "Yes");
    }

    #[test]
    fn dob_timestamp_uses_display_offset() {
        let r = record(json!({"DOB": "1990-05-11T18:30:00.000Z"}));
        let ist = Calendar::new(Calendar::parse_offset("+05:30").unwrap());
        assert_eq!(document_rows(&[&r], &ist)[0][5], "12/05/1990");
        assert_eq!(document_rows(&[&r], &Calendar::utc())[0][5], "11/05/1990");
    }

    #[test]
    fn unparsable_dob_passes_through() {
        let r = record(json!({"DOB": "sometime in 1990"}));
        assert_eq!(document_rows(&[&r], &Calendar::utc())[0][5], "sometime in 1990");
    }

    #[test]
    fn empty_list_is_no_data() {
        assert_matches!(
            export_document(&[], &Calendar::utc(), generated_at(), &ExportSettings::default()),
            Err(ExportError::NoData)
        );
    }

    #[test]
    fn builds_single_page_pdf() {
        let r = record(json!({"SNo": 1, "Name": "Asha", "HouseNo": "12B"}));
        let artifact =
            export_document(&[&r], &Calendar::utc(), generated_at(), &ExportSettings::default())
                .unwrap();
        assert_eq!(artifact.file_name, "GovSurveyData_20240615-140309.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&artifact.bytes), 1);
        assert!(count(&artifact.bytes, b"Helvetica-Bold") >= 1);
    }

    #[test]
    fn many_records_span_pages() {
        let records: Vec<SurveyRecord> = (0..150)
            .map(|i| record(json!({"SNo": i, "Name": format!("Resident {i}")})))
            .collect();
        let refs: Vec<&SurveyRecord> = records.iter().collect();
        let artifact =
            export_document(&refs, &Calendar::utc(), generated_at(), &ExportSettings::default())
                .unwrap();
        assert!(page_count(&artifact.bytes) > 1);
    }
}
