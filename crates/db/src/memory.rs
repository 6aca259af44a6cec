//! In-memory [`BookingRepository`] for tests and local experiments.
//!
//! Applies the same overlap rule as the SQL queries and mimics the table
//! constraints (foreign keys, `start < end`, no overlapping blocks per room).
//! Individual operations can be made to fail to exercise error paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bookings_core::dates::StayDates;
use bookings_core::types::DbId;
use chrono::Utc;

use crate::error::RepoError;
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::room::Room;
use crate::models::room_restriction::{NewRoomRestriction, RoomRestriction};
use crate::models::user::{CreateUser, User};
use crate::store::BookingRepository;

#[derive(Debug, Default)]
struct Faults {
    reservation_insert: bool,
    restriction_insert: bool,
    queries: bool,
}

#[derive(Debug, Default)]
struct State {
    rooms: BTreeMap<DbId, Room>,
    reservations: BTreeMap<DbId, Reservation>,
    restrictions: BTreeMap<DbId, RoomRestriction>,
    users: BTreeMap<DbId, User>,
    next_id: DbId,
    faults: Faults,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn check_queries(&self) -> Result<(), RepoError> {
        if self.faults.queries {
            return Err(RepoError::Storage("injected query failure".into()));
        }
        Ok(())
    }

    fn room_is_free(&self, room_id: DbId, stay: &StayDates) -> bool {
        !self
            .restrictions
            .values()
            .any(|r| r.room_id == room_id && stay.overlaps(r.start_date, r.end_date))
    }

    fn insert_reservation(&mut self, input: &NewReservation) -> Result<DbId, RepoError> {
        if self.faults.reservation_insert {
            return Err(RepoError::Storage("injected reservation insert failure".into()));
        }
        let room_name = self
            .rooms
            .get(&input.room_id)
            .map(|room| room.room_name.clone())
            .ok_or_else(|| RepoError::Constraint("reservations_room_id_fkey".into()))?;
        if input.start_date >= input.end_date {
            return Err(RepoError::Constraint("ck_reservations_dates".into()));
        }

        let id = self.next_id();
        let now = Utc::now();
        self.reservations.insert(
            id,
            Reservation {
                id,
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: input.email.clone(),
                phone: input.phone.clone(),
                start_date: input.start_date,
                end_date: input.end_date,
                room_id: input.room_id,
                room_name,
                processed: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn insert_restriction(&mut self, input: &NewRoomRestriction) -> Result<DbId, RepoError> {
        if self.faults.restriction_insert {
            return Err(RepoError::Storage("injected restriction insert failure".into()));
        }
        if !self.rooms.contains_key(&input.room_id) {
            return Err(RepoError::Constraint("room_restrictions_room_id_fkey".into()));
        }
        if let Some(reservation_id) = input.reservation_id {
            if !self.reservations.contains_key(&reservation_id) {
                return Err(RepoError::Constraint(
                    "room_restrictions_reservation_id_fkey".into(),
                ));
            }
        }
        let stay = StayDates::new(input.start_date, input.end_date)
            .map_err(|_| RepoError::Constraint("ck_room_restrictions_dates".into()))?;
        if !self.room_is_free(input.room_id, &stay) {
            return Err(RepoError::Unavailable);
        }

        let id = self.next_id();
        let now = Utc::now();
        self.restrictions.insert(
            id,
            RoomRestriction {
                id,
                start_date: input.start_date,
                end_date: input.end_date,
                room_id: input.room_id,
                reservation_id: input.reservation_id,
                restriction_id: input.restriction_id,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn reservation_mut(&mut self, id: DbId) -> Result<&mut Reservation, RepoError> {
        self.reservations
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Reservation", id))
    }
}

fn sorted_by_start(mut list: Vec<Reservation>) -> Vec<Reservation> {
    list.sort_by_key(|r| (r.start_date, r.id));
    list
}

/// Mutex-guarded tables. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryBookingRepository {
    state: Mutex<State>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the two standard rooms (ids 1 and 2).
    pub fn seeded() -> Self {
        let repo = Self::new();
        repo.add_room("General's Quarters", "generals-quarters");
        repo.add_room("Major's Suite", "majors-suite");
        repo
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a room, returning its ID.
    pub fn add_room(&self, name: &str, slug: &str) -> DbId {
        let mut state = self.lock();
        let id = state.next_id();
        let now = Utc::now();
        state.rooms.insert(
            id,
            Room {
                id,
                room_name: name.to_string(),
                room_description: String::new(),
                room_url: slug.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Make every subsequent reservation insert fail.
    pub fn fail_reservation_inserts(&self, fail: bool) {
        self.lock().faults.reservation_insert = fail;
    }

    /// Make every subsequent restriction insert fail.
    pub fn fail_restriction_inserts(&self, fail: bool) {
        self.lock().faults.restriction_insert = fail;
    }

    /// Make every read fail.
    pub fn fail_queries(&self, fail: bool) {
        self.lock().faults.queries = fail;
    }

    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    pub fn restrictions(&self) -> Vec<RoomRestriction> {
        self.lock().restrictions.values().cloned().collect()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn ping(&self) -> Result<(), RepoError> {
        self.lock().check_queries()
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        Ok(state.rooms.values().cloned().collect())
    }

    async fn get_room_by_id(&self, id: DbId) -> Result<Room, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        state
            .rooms
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Room", id))
    }

    async fn get_room_by_slug(&self, slug: &str) -> Result<Room, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        state
            .rooms
            .values()
            .find(|room| room.room_url == slug)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Room", slug))
    }

    async fn search_availability_for_room(
        &self,
        stay: &StayDates,
        room_id: DbId,
    ) -> Result<bool, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        Ok(state.room_is_free(room_id, stay))
    }

    async fn search_availability_all_rooms(
        &self,
        stay: &StayDates,
    ) -> Result<Vec<Room>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        Ok(state
            .rooms
            .values()
            .filter(|room| state.room_is_free(room.id, stay))
            .cloned()
            .collect())
    }

    async fn insert_reservation(&self, input: &NewReservation) -> Result<DbId, RepoError> {
        self.lock().insert_reservation(input)
    }

    async fn insert_room_restriction(&self, input: &NewRoomRestriction) -> Result<(), RepoError> {
        self.lock().insert_restriction(input).map(|_| ())
    }

    async fn commit_booking(&self, input: &NewReservation) -> Result<DbId, RepoError> {
        let mut state = self.lock();
        let stay = StayDates::new(input.start_date, input.end_date)
            .map_err(|e| RepoError::Constraint(e.to_string()))?;
        if !state.rooms.contains_key(&input.room_id) {
            return Err(RepoError::not_found("Room", input.room_id));
        }
        if !state.room_is_free(input.room_id, &stay) {
            return Err(RepoError::Unavailable);
        }

        let reservation_id = state.insert_reservation(input)?;
        let restriction = NewRoomRestriction::for_reservation(
            reservation_id,
            input.room_id,
            input.start_date,
            input.end_date,
        );
        if let Err(e) = state.insert_restriction(&restriction) {
            // Roll back the first write.
            state.reservations.remove(&reservation_id);
            return Err(e);
        }
        Ok(reservation_id)
    }

    async fn all_reservations(
        &self,
        window: Option<StayDates>,
    ) -> Result<Vec<Reservation>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        let list = state
            .reservations
            .values()
            .filter(|r| window.map_or(true, |w| w.overlaps(r.start_date, r.end_date)))
            .cloned()
            .collect();
        Ok(sorted_by_start(list))
    }

    async fn all_new_reservations(&self) -> Result<Vec<Reservation>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        let list = state
            .reservations
            .values()
            .filter(|r| !r.processed)
            .cloned()
            .collect();
        Ok(sorted_by_start(list))
    }

    async fn get_reservation_by_id(&self, id: DbId) -> Result<Reservation, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        state
            .reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Reservation", id))
    }

    async fn update_reservation(
        &self,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<(), RepoError> {
        let mut state = self.lock();
        let reservation = state.reservation_mut(id)?;
        reservation.first_name = input.first_name.clone();
        reservation.last_name = input.last_name.clone();
        reservation.email = input.email.clone();
        reservation.phone = input.phone.clone();
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_reservation(&self, id: DbId) -> Result<(), RepoError> {
        let mut state = self.lock();
        state
            .reservations
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("Reservation", id))?;
        state
            .restrictions
            .retain(|_, r| r.reservation_id != Some(id));
        Ok(())
    }

    async fn update_processed(&self, id: DbId, processed: bool) -> Result<(), RepoError> {
        let mut state = self.lock();
        let reservation = state.reservation_mut(id)?;
        reservation.processed = processed;
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, RepoError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(RepoError::Constraint("uq_users_email".into()));
        }
        let id = state.next_id();
        let now = Utc::now();
        let user = User {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            access_level: input.access_level,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: DbId) -> Result<User, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("User", id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let state = self.lock();
        state.check_queries()?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(users)
    }

    async fn delete_user(&self, id: DbId) -> Result<(), RepoError> {
        self.lock()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("User", id))
    }
}
