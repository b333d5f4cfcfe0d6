//! # survey-core
//!
//! Foundation types and pure data transformations for the household survey
//! client.
//!
//! - **Records**: [`SurveyRecord`] with loosely typed [`FieldValue`] cells
//! - **Calendar**: date parsing in a fixed display offset, calendar-aware age
//! - **Filtering**: the four conjunctive criteria of the details view
//! - **Table**: projection of records into display rows
//! - **Cache**: the explicitly owned, explicitly invalidated record list
//! - **Form**: the entry form and its `Not Filled` submission payload
//! - **Gateway**: the async contract for the remote spreadsheet endpoint

#![deny(unsafe_code)]

pub mod age;
pub mod cache;
pub mod dates;
pub mod filter;
pub mod form;
pub mod gateway;
pub mod logging;
pub mod record;
pub mod table;

pub use age::{age_on, age_on_date};
pub use cache::{Invalidation, RecordCache};
pub use dates::Calendar;
pub use filter::{FilterCriteria, filter_records};
pub use form::{FormField, NOT_FILLED, Submission, SurveyForm, UnknownField};
pub use gateway::{GatewayError, SurveyGateway};
pub use record::{FIELD_KEYS, FieldValue, SurveyRecord, sort_by_sequence_desc};
pub use table::{DisplayRow, TABLE_COLUMNS, TableView};
