//! The storage seam the HTTP layer depends on.

use async_trait::async_trait;
use bookings_core::dates::StayDates;
use bookings_core::types::DbId;

use crate::error::RepoError;
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::room::Room;
use crate::models::room_restriction::NewRoomRestriction;
use crate::models::user::{CreateUser, User};

/// Availability queries and reservation/user persistence.
///
/// Implementations must use half-open overlap semantics: an existing block
/// `[s, e)` collides with a requested stay iff `s < stay.end && e > stay.start`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), RepoError>;

    // ---- rooms -----------------------------------------------------------

    async fn all_rooms(&self) -> Result<Vec<Room>, RepoError>;

    async fn get_room_by_id(&self, id: DbId) -> Result<Room, RepoError>;

    async fn get_room_by_slug(&self, slug: &str) -> Result<Room, RepoError>;

    /// `true` iff no restriction on `room_id` overlaps `stay`.
    async fn search_availability_for_room(
        &self,
        stay: &StayDates,
        room_id: DbId,
    ) -> Result<bool, RepoError>;

    /// Every room with no overlapping restriction, ordered by ID.
    async fn search_availability_all_rooms(&self, stay: &StayDates)
        -> Result<Vec<Room>, RepoError>;

    // ---- booking writes --------------------------------------------------

    /// Insert a reservation on its own. Either the row is written or nothing is.
    async fn insert_reservation(&self, input: &NewReservation) -> Result<DbId, RepoError>;

    /// Insert a restriction on its own. Either the row is written or nothing is.
    async fn insert_room_restriction(&self, input: &NewRoomRestriction) -> Result<(), RepoError>;

    /// Re-check availability and write the reservation plus its restriction
    /// in a single unit. On any error neither row exists afterwards.
    ///
    /// Fails with [`RepoError::Unavailable`] when another booking already
    /// holds some of the nights.
    async fn commit_booking(&self, input: &NewReservation) -> Result<DbId, RepoError>;

    // ---- reservation administration --------------------------------------

    /// Reservations ordered by start date, optionally only those overlapping
    /// `window`.
    async fn all_reservations(
        &self,
        window: Option<StayDates>,
    ) -> Result<Vec<Reservation>, RepoError>;

    /// Reservations with `processed == false`, ordered by start date.
    async fn all_new_reservations(&self) -> Result<Vec<Reservation>, RepoError>;

    async fn get_reservation_by_id(&self, id: DbId) -> Result<Reservation, RepoError>;

    async fn update_reservation(
        &self,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<(), RepoError>;

    /// Delete a reservation and its restrictions.
    async fn delete_reservation(&self, id: DbId) -> Result<(), RepoError>;

    async fn update_processed(&self, id: DbId, processed: bool) -> Result<(), RepoError>;

    // ---- users -----------------------------------------------------------

    async fn create_user(&self, input: &CreateUser) -> Result<User, RepoError>;

    async fn get_user_by_id(&self, id: DbId) -> Result<User, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn list_users(&self) -> Result<Vec<User>, RepoError>;

    async fn delete_user(&self, id: DbId) -> Result<(), RepoError>;
}
