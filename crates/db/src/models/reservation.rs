//! Reservation entity model and DTOs.

use bookings_core::dates::StayDates;
use bookings_core::forms::GuestDetails;
use bookings_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reservations` table joined with its room name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: Date,
    pub end_date: Date,
    pub room_id: DbId,
    /// Denormalized from `rooms.room_name` for display.
    pub room_name: String,
    pub processed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn guest(&self) -> GuestDetails {
        GuestDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// DTO for inserting a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: Date,
    pub end_date: Date,
    pub room_id: DbId,
}

impl NewReservation {
    pub fn new(guest: &GuestDetails, stay: StayDates, room_id: DbId) -> Self {
        Self {
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            email: guest.email.clone(),
            phone: guest.phone.clone(),
            start_date: stay.start,
            end_date: stay.end,
            room_id,
        }
    }
}

/// DTO for the admin edit form. Dates and room are not editable.
#[derive(Debug, Clone)]
pub struct UpdateReservation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<GuestDetails> for UpdateReservation {
    fn from(guest: GuestDetails) -> Self {
        Self {
            first_name: guest.first_name,
            last_name: guest.last_name,
            email: guest.email,
            phone: guest.phone,
        }
    }
}
