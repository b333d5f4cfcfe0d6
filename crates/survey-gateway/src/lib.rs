//! # survey-gateway
//!
//! Implementations of [`survey_core::SurveyGateway`]:
//!
//! - [`HttpGateway`]: the spreadsheet web app over HTTP (form-encoded POST,
//!   JSON GET), one attempt per call
//! - [`MockGateway`]: scripted outcomes for deterministic tests

#![deny(unsafe_code)]

pub mod http;
pub mod mock;
pub mod response;

pub use http::HttpGateway;
pub use mock::{MockGateway, MockReply};
