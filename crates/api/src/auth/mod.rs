//! Authentication helpers: password hashing and administrator bootstrap.

pub mod bootstrap;
pub mod password;
