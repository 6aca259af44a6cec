//! Repository for the `reservations` table.

use bookings_core::dates::StayDates;
use bookings_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};

/// Selected columns, qualified for the join with `rooms`.
const SELECT: &str = "SELECT r.id, r.first_name, r.last_name, r.email, r.phone, \
                      r.start_date, r.end_date, r.room_id, rm.room_name, r.processed, \
                      r.created_at, r.updated_at \
                      FROM reservations r JOIN rooms rm ON rm.id = r.room_id";

pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a reservation, returning its new ID.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewReservation,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO reservations
                 (first_name, last_name, email, phone, start_date, end_date, room_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.room_id)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All reservations ordered by start date, optionally limited to those
    /// overlapping `window`.
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
        window: Option<&StayDates>,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        match window {
            Some(stay) => {
                let query = format!(
                    "{SELECT} WHERE r.start_date < $2 AND r.end_date > $1
                     ORDER BY r.start_date, r.id"
                );
                sqlx::query_as::<_, Reservation>(&query)
                    .bind(stay.start)
                    .bind(stay.end)
                    .fetch_all(executor)
                    .await
            }
            None => {
                let query = format!("{SELECT} ORDER BY r.start_date, r.id");
                sqlx::query_as::<_, Reservation>(&query)
                    .fetch_all(executor)
                    .await
            }
        }
    }

    /// Reservations not yet marked processed, ordered by start date.
    pub async fn list_new<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.processed = FALSE ORDER BY r.start_date, r.id");
        sqlx::query_as::<_, Reservation>(&query)
            .fetch_all(executor)
            .await
    }

    /// Update guest details. Returns `false` if no row with `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reservations SET
                first_name = $2, last_name = $3, email = $4, phone = $5,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a reservation (its restrictions cascade). Returns `false` if
    /// no row with `id` exists.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the processed flag. Returns `false` if no row with `id` exists.
    pub async fn set_processed<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        processed: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reservations SET processed = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(processed)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
