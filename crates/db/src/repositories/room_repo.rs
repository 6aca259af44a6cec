//! Repository for the `rooms` table and the room-level availability query.

use bookings_core::dates::StayDates;
use bookings_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::room::Room;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, room_name, room_description, room_url, created_at, updated_at";

/// Read-only access to rooms.
pub struct RoomRepo;

impl RoomRepo {
    /// Find a room by internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a room by its URL slug.
    pub async fn find_by_url<'e>(
        executor: impl PgExecutor<'e>,
        room_url: &str,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE room_url = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(room_url)
            .fetch_optional(executor)
            .await
    }

    /// List every room ordered by ID.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms ORDER BY id");
        sqlx::query_as::<_, Room>(&query).fetch_all(executor).await
    }

    /// Rooms with no restriction overlapping `[start, end)`, ordered by ID.
    pub async fn list_available<'e>(
        executor: impl PgExecutor<'e>,
        stay: &StayDates,
    ) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rooms r
             WHERE NOT EXISTS (
                 SELECT 1 FROM room_restrictions rr
                 WHERE rr.room_id = r.id
                   AND rr.start_date < $2
                   AND rr.end_date > $1
             )
             ORDER BY r.id"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(stay.start)
            .bind(stay.end)
            .fetch_all(executor)
            .await
    }

    /// Take a row lock on a room for the rest of the enclosing transaction.
    ///
    /// Returns `false` when the room does not exist.
    pub async fn lock<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }
}
