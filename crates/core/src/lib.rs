//! Domain building blocks for the bookings service.
//!
//! This crate has no I/O and no internal dependencies so that the storage
//! layer, the HTTP layer and tests can all share the same rules for dates,
//! drafts and form validation.

pub mod access;
pub mod dates;
pub mod draft;
pub mod error;
pub mod forms;
pub mod types;
