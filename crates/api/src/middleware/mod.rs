//! Request extractors that gate access to handlers.

pub mod admin;
