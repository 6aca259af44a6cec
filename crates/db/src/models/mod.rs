//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO where the entity can be edited

pub mod reservation;
pub mod room;
pub mod room_restriction;
pub mod user;
