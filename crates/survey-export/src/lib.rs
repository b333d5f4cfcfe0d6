//! # survey-export
//!
//! Turns a filtered record list into a downloadable file.
//!
//! - [`export_spreadsheet`]: one `.xlsx` sheet, field for field
//! - [`export_document`]: an A4 landscape `.pdf` report with a fixed
//!   twenty-column grid, paginated with the header repeated on every page
//!
//! Both refuse an empty record list with [`ExportError::NoData`] and build
//! the whole artifact in memory; [`ExportArtifact::write_to`] puts it on disk.

#![deny(unsafe_code)]

pub mod artifact;
pub mod document;
pub mod errors;
mod fonts;
pub mod layout;
pub mod spreadsheet;

pub use artifact::{ExportArtifact, export_timestamp};
pub use document::{DOCUMENT_COLUMNS, document_rows, export_document};
pub use errors::ExportError;
pub use spreadsheet::{export_spreadsheet, header_keys};
