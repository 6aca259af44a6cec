//! Repository for the `room_restrictions` table.

use bookings_core::dates::StayDates;
use bookings_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::room_restriction::{NewRoomRestriction, RoomRestriction};

const COLUMNS: &str = "id, start_date, end_date, room_id, reservation_id, restriction_id, \
                       created_at, updated_at";

pub struct RoomRestrictionRepo;

impl RoomRestrictionRepo {
    /// Insert a restriction, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewRoomRestriction,
    ) -> Result<RoomRestriction, sqlx::Error> {
        let query = format!(
            "INSERT INTO room_restrictions
                 (start_date, end_date, room_id, reservation_id, restriction_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoomRestriction>(&query)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.room_id)
            .bind(input.reservation_id)
            .bind(input.restriction_id)
            .fetch_one(executor)
            .await
    }

    /// Number of restrictions on `room_id` overlapping `[start, end)`.
    pub async fn count_overlapping<'e>(
        executor: impl PgExecutor<'e>,
        room_id: DbId,
        stay: &StayDates,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM room_restrictions
             WHERE room_id = $1 AND start_date < $3 AND end_date > $2",
        )
        .bind(room_id)
        .bind(stay.start)
        .bind(stay.end)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Restrictions belonging to a reservation.
    pub async fn list_by_reservation<'e>(
        executor: impl PgExecutor<'e>,
        reservation_id: DbId,
    ) -> Result<Vec<RoomRestriction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM room_restrictions WHERE reservation_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, RoomRestriction>(&query)
            .bind(reservation_id)
            .fetch_all(executor)
            .await
    }
}
