//! Session-carried draft reservation and the booking workflow steps.
//!
//! A draft is a plain serializable value. The HTTP layer reads it from the
//! visitor's session, produces an updated copy and writes it back on every
//! step; nothing holds a reference to it between requests.

use serde::{Deserialize, Serialize};

use crate::dates::StayDates;
use crate::error::CoreError;
use crate::forms::GuestDetails;
use crate::types::DbId;

/// Restriction type written alongside every reservation made through the
/// booking flow ("created via reservation").
pub const RESTRICTION_TYPE_RESERVATION: DbId = 1;

/// Position of a draft in the booking workflow.
///
/// `NoDraft` is represented by the absence of a draft in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    DatesChosen,
    RoomChosen,
    Committed,
}

/// Room picked for a draft, with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenRoom {
    pub id: DbId,
    pub name: String,
}

/// In-progress reservation held in the visitor's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReservation {
    pub stay: StayDates,
    pub room: Option<ChosenRoom>,
    pub guest: Option<GuestDetails>,
    /// Storage id, set once the reservation has been committed.
    pub reservation_id: Option<DbId>,
}

impl DraftReservation {
    /// Fresh draft after a successful availability search.
    pub fn with_dates(stay: StayDates) -> Self {
        Self {
            stay,
            room: None,
            guest: None,
            reservation_id: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        match (&self.room, self.reservation_id) {
            (_, Some(_)) => BookingStep::Committed,
            (Some(_), None) => BookingStep::RoomChosen,
            (None, None) => BookingStep::DatesChosen,
        }
    }

    /// Select a room. Selecting again replaces the previous choice; a
    /// committed draft cannot be changed.
    pub fn choose_room(self, room: ChosenRoom) -> Result<Self, CoreError> {
        if self.step() == BookingStep::Committed {
            return Err(CoreError::Conflict(
                "Reservation has already been confirmed".into(),
            ));
        }
        Ok(Self {
            room: Some(room),
            ..self
        })
    }

    /// The room, if the draft has reached [`BookingStep::RoomChosen`].
    pub fn require_room(&self) -> Result<&ChosenRoom, CoreError> {
        match (self.step(), &self.room) {
            (BookingStep::RoomChosen, Some(room)) => Ok(room),
            _ => Err(CoreError::SessionMissing),
        }
    }

    /// Record the committed reservation and the guest details it was made with.
    pub fn committed(self, reservation_id: DbId, guest: GuestDetails) -> Self {
        Self {
            guest: Some(guest),
            reservation_id: Some(reservation_id),
            ..self
        }
    }
}
