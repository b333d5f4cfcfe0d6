//! # survey-runtime
//!
//! The stateful layer between the command surface and the pure crates.
//!
//! - [`SurveySession`]: owns the gateway, the record cache, the active view
//!   and the filter, and turns every user action into at most one gateway
//!   call plus a status notification
//! - [`StatusBoard`]: the current notification, reset by a cancellable
//!   timer

#![deny(unsafe_code)]

pub mod errors;
pub mod notify;
pub mod session;

pub use errors::SessionError;
pub use notify::{Notification, NotificationLevel, StatusBoard};
pub use session::{SurveySession, View, resolve_calendar};
