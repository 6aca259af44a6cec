//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept any `PgExecutor` as the first argument, so the same SQL runs
//! against the pool or inside an open transaction (`&mut *tx`).

pub mod reservation_repo;
pub mod room_repo;
pub mod room_restriction_repo;
pub mod user_repo;

pub use reservation_repo::ReservationRepo;
pub use room_repo::RoomRepo;
pub use room_restriction_repo::RoomRestrictionRepo;
pub use user_repo::UserRepo;
