//! Room restriction (availability block) model and DTOs.

use bookings_core::draft::RESTRICTION_TYPE_RESERVATION;
use bookings_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `room_restrictions` table: the room is blocked for
/// `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RoomRestriction {
    pub id: DbId,
    pub start_date: Date,
    pub end_date: Date,
    pub room_id: DbId,
    pub reservation_id: Option<DbId>,
    pub restriction_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a room restriction.
#[derive(Debug, Clone)]
pub struct NewRoomRestriction {
    pub start_date: Date,
    pub end_date: Date,
    pub room_id: DbId,
    pub reservation_id: Option<DbId>,
    pub restriction_id: DbId,
}

impl NewRoomRestriction {
    /// The block that accompanies a reservation made through the booking flow.
    pub fn for_reservation(
        reservation_id: DbId,
        room_id: DbId,
        start_date: Date,
        end_date: Date,
    ) -> Self {
        Self {
            start_date,
            end_date,
            room_id,
            reservation_id: Some(reservation_id),
            restriction_id: RESTRICTION_TYPE_RESERVATION,
        }
    }
}
