//! Page geometry and grid table layout for the document export.
//!
//! Layout is pure arithmetic over font metrics: column widths are sized to
//! content and squeezed to the printable width, cells are word-wrapped to
//! their column, and rows are split into pages so that each page holds a
//! repeated header plus as many whole rows as fit.

use std::ops::Range;

use crate::fonts::Face;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Page and table metrics, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSpec {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Margin on every side.
    pub margin: f32,
    /// Distance from the top edge to the table on the first page, leaving
    /// room for the title block.
    pub first_table_top: f32,
    /// Table font size.
    pub font_size: f32,
    /// Padding inside each cell.
    pub cell_padding: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl PageSpec {
    /// A4 landscape, 14 mm margins, 7 pt text, 1.5 mm cell padding.
    pub fn a4_landscape() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: 14.0 * MM,
            first_table_top: 30.0 * MM,
            font_size: 7.0,
            cell_padding: 1.5 * MM,
            line_spacing: 1.15,
        }
    }

    /// Width available to the table.
    pub fn table_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Height of one text line.
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_spacing
    }

    fn body_height(&self, first_page: bool) -> f32 {
        let top = if first_page {
            self.first_table_top
        } else {
            self.margin
        };
        self.height - top - self.margin
    }
}

/// One row after wrapping: the lines of each cell, and the row height.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutRow {
    /// Wrapped lines per cell, aligned with the column widths.
    pub cells: Vec<Vec<String>>,
    /// Total row height including padding.
    pub height: f32,
}

/// A table ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    /// Column widths in points; they sum to the table width.
    pub widths: Vec<f32>,
    /// Header row, drawn at the top of every page.
    pub header: LaidOutRow,
    /// Body rows.
    pub rows: Vec<LaidOutRow>,
    /// Body row ranges per page.
    pub pages: Vec<Range<usize>>,
}

/// Lay out `header` and `rows` (each row aligned with `header`) on pages of
/// `paper`.
pub fn layout_table(header: &[&str], rows: &[Vec<String>], paper: &PageSpec) -> TableLayout {
    let widths = column_widths(header, rows, paper);
    let header_row = wrap_row(header.iter().copied(), &widths, Face::Bold, paper);
    let body: Vec<LaidOutRow> = rows
        .iter()
        .map(|row| wrap_row(row.iter().map(String::as_str), &widths, Face::Regular, paper))
        .collect();
    let heights: Vec<f32> = body.iter().map(|r| r.height).collect();
    let pages = paginate(&heights, header_row.height, paper);
    TableLayout {
        widths,
        header: header_row,
        rows: body,
        pages,
    }
}

fn column_widths(header: &[&str], rows: &[Vec<String>], paper: &PageSpec) -> Vec<f32> {
    let size = paper.font_size;
    let padding = 2.0 * paper.cell_padding;

    let mut preferred = Vec::with_capacity(header.len());
    let mut minimum = Vec::with_capacity(header.len());
    for (col, title) in header.iter().enumerate() {
        let mut pref = Face::Bold.text_width(title, size);
        let mut min = longest_word(title, Face::Bold, size);
        for row in rows {
            if let Some(cell) = row.get(col) {
                pref = pref.max(Face::Regular.text_width(cell, size));
                min = min.max(longest_word(cell, Face::Regular, size));
            }
        }
        preferred.push(pref + padding);
        minimum.push(min.min(pref) + padding);
    }

    let available = paper.table_width();
    let total_pref: f32 = preferred.iter().sum();
    if total_pref <= available {
        let scale = available / total_pref;
        return preferred.iter().map(|w| w * scale).collect();
    }

    let total_min: f32 = minimum.iter().sum();
    if total_min >= available {
        let scale = available / total_min;
        return minimum.iter().map(|w| w * scale).collect();
    }

    let share = (available - total_min) / (total_pref - total_min);
    preferred
        .iter()
        .zip(&minimum)
        .map(|(pref, min)| min + (pref - min) * share)
        .collect()
}

fn longest_word(text: &str, face: Face, size: f32) -> f32 {
    text.split_whitespace()
        .map(|w| face.text_width(w, size))
        .fold(0.0, f32::max)
}

#[allow(clippy::cast_precision_loss)]
fn wrap_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[f32],
    face: Face,
    paper: &PageSpec,
) -> LaidOutRow {
    let cells: Vec<Vec<String>> = cells
        .zip(widths)
        .map(|(text, width)| {
            wrap_text(text, width - 2.0 * paper.cell_padding, face, paper.font_size)
        })
        .collect();
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    LaidOutRow {
        cells,
        height: lines as f32 * paper.line_height() + 2.0 * paper.cell_padding,
    }
}

/// Greedy word wrap. Words wider than the line are broken between
/// characters. Always returns at least one line.
pub(crate) fn wrap_text(text: &str, max_width: f32, face: Face, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if face.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if face.text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, face, size);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn break_word(word: &str, max_width: f32, face: Face, size: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && face.text_width(&piece, size) > max_width {
            let _ = piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    pieces.push(piece);
    pieces
}

/// Split body rows into pages. Every page gets at least one row, so a row
/// taller than a page still lands somewhere.
fn paginate(heights: &[f32], header_height: f32, paper: &PageSpec) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    while start < heights.len() {
        let capacity = paper.body_height(pages.is_empty()) - header_height;
        let mut used = heights[start];
        let mut end = start + 1;
        while end < heights.len() && used + heights[end] <= capacity {
            used += heights[end];
            end += 1;
        }
        pages.push(start..end);
        start = end;
    }
    if pages.is_empty() {
        pages.push(0..0);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> PageSpec {
        PageSpec::a4_landscape()
    }

    #[test]
    fn a4_landscape_geometry() {
        let paper = paper();
        assert!(paper.width > paper.height);
        assert!((paper.margin - 39.685).abs() < 0.01);
        assert!((paper.cell_padding - 4.252).abs() < 0.01);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Asha Devi", 200.0, Face::Regular, 7.0), vec!["Asha Devi"]);
    }

    #[test]
    fn wrap_breaks_between_words() {
        let lines = wrap_text("high blood pressure", 40.0, Face::Regular, 7.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "high blood pressure");
        for line in &lines {
            assert!(Face::Regular.text_width(line, 7.0) <= 40.0);
        }
    }

    #[test]
    fn wrap_breaks_long_words() {
        let lines = wrap_text("123456789012345678901234", 20.0, Face::Regular, 7.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "123456789012345678901234");
    }

    #[test]
    fn wrap_empty_is_one_blank_line() {
        assert_eq!(wrap_text("", 50.0, Face::Regular, 7.0), vec![String::new()]);
    }

    #[test]
    fn widths_fill_table_width() {
        let header = ["SNo", "Name"];
        let rows = vec![vec!["1".to_string(), "Asha".to_string()]];
        let layout = layout_table(&header, &rows, &paper());
        let total: f32 = layout.widths.iter().sum();
        assert!((total - paper().table_width()).abs() < 0.01);
    }

    #[test]
    fn wide_content_is_squeezed_and_wrapped() {
        let header = ["SNo", "Diseases"];
        let rows = vec![vec!["1".to_string(), "diabetes ".repeat(60)]];
        let layout = layout_table(&header, &rows, &paper());
        let total: f32 = layout.widths.iter().sum();
        assert!(total <= paper().table_width() + 0.01);
        assert!(layout.rows[0].cells[1].len() > 1);
        assert!(layout.rows[0].height > layout.header.height);
    }

    #[test]
    fn pages_split_and_cover_every_row() {
        let header = ["SNo", "Name"];
        let rows: Vec<Vec<String>> = (0..200)
            .map(|i| vec![i.to_string(), format!("Resident {i}")])
            .collect();
        let layout = layout_table(&header, &rows, &paper());
        assert!(layout.pages.len() > 1);
        assert_eq!(layout.pages[0].start, 0);
        assert_eq!(layout.pages.last().unwrap().end, 200);
        for pair in layout.pages.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // later pages have no title block, so they hold more rows
        assert!(layout.pages[1].len() > layout.pages[0].len());
    }

    #[test]
    fn oversized_row_gets_its_own_page() {
        let paper = paper();
        let heights = [10.0, paper.height * 2.0, 10.0];
        let pages = paginate(&heights, 12.0, &paper);
        assert_eq!(pages, vec![0..1, 1..2, 2..3]);
    }
}
