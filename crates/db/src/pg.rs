//! Postgres-backed [`BookingRepository`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bookings_core::dates::StayDates;
use bookings_core::types::DbId;

use crate::error::RepoError;
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::room::Room;
use crate::models::room_restriction::NewRoomRestriction;
use crate::models::user::{CreateUser, User};
use crate::repositories::{ReservationRepo, RoomRepo, RoomRestrictionRepo, UserRepo};
use crate::store::BookingRepository;
use crate::DbPool;

/// Default bound on a single storage operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs every operation against the pool under a fixed timeout. Writes
/// happen inside explicit transactions, so a timed-out (dropped) operation
/// rolls back instead of leaving a partial write.
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: DbPool,
    op_timeout: Duration,
}

impl PgBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self::with_timeout(pool, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(pool: DbPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn timed<T, F>(&self, op: &'static str, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, RepoError>> + Send,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "Storage operation timed out"
                );
                Err(RepoError::Timeout(self.op_timeout))
            }
        }
    }

    async fn commit_booking_tx(&self, input: &NewReservation) -> Result<DbId, RepoError> {
        let stay = StayDates::new(input.start_date, input.end_date)
            .map_err(|e| RepoError::Constraint(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        // Serialises bookings per room: a competing transaction waits here
        // and then sees our restriction in its overlap check.
        if !RoomRepo::lock(&mut *tx, input.room_id).await? {
            return Err(RepoError::not_found("Room", input.room_id));
        }
        if RoomRestrictionRepo::count_overlapping(&mut *tx, input.room_id, &stay).await? > 0 {
            return Err(RepoError::Unavailable);
        }

        let reservation_id = ReservationRepo::create(&mut *tx, input).await?;
        let restriction = NewRoomRestriction::for_reservation(
            reservation_id,
            input.room_id,
            input.start_date,
            input.end_date,
        );
        RoomRestrictionRepo::create(&mut *tx, &restriction).await?;

        tx.commit().await?;
        Ok(reservation_id)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn ping(&self) -> Result<(), RepoError> {
        self.timed("ping", async {
            crate::health_check(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, RepoError> {
        self.timed("all_rooms", async { Ok(RoomRepo::list(&self.pool).await?) })
            .await
    }

    async fn get_room_by_id(&self, id: DbId) -> Result<Room, RepoError> {
        self.timed("get_room_by_id", async {
            RoomRepo::find_by_id(&self.pool, id)
                .await?
                .ok_or_else(|| RepoError::not_found("Room", id))
        })
        .await
    }

    async fn get_room_by_slug(&self, slug: &str) -> Result<Room, RepoError> {
        self.timed("get_room_by_slug", async {
            RoomRepo::find_by_url(&self.pool, slug)
                .await?
                .ok_or_else(|| RepoError::not_found("Room", slug))
        })
        .await
    }

    async fn search_availability_for_room(
        &self,
        stay: &StayDates,
        room_id: DbId,
    ) -> Result<bool, RepoError> {
        self.timed("search_availability_for_room", async {
            let count = RoomRestrictionRepo::count_overlapping(&self.pool, room_id, stay).await?;
            Ok(count == 0)
        })
        .await
    }

    async fn search_availability_all_rooms(
        &self,
        stay: &StayDates,
    ) -> Result<Vec<Room>, RepoError> {
        self.timed("search_availability_all_rooms", async {
            Ok(RoomRepo::list_available(&self.pool, stay).await?)
        })
        .await
    }

    async fn insert_reservation(&self, input: &NewReservation) -> Result<DbId, RepoError> {
        self.timed("insert_reservation", async {
            let mut tx = self.pool.begin().await?;
            let id = ReservationRepo::create(&mut *tx, input).await?;
            tx.commit().await?;
            Ok(id)
        })
        .await
    }

    async fn insert_room_restriction(&self, input: &NewRoomRestriction) -> Result<(), RepoError> {
        self.timed("insert_room_restriction", async {
            let mut tx = self.pool.begin().await?;
            RoomRestrictionRepo::create(&mut *tx, input).await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn commit_booking(&self, input: &NewReservation) -> Result<DbId, RepoError> {
        self.timed("commit_booking", self.commit_booking_tx(input))
            .await
    }

    async fn all_reservations(
        &self,
        window: Option<StayDates>,
    ) -> Result<Vec<Reservation>, RepoError> {
        self.timed("all_reservations", async {
            Ok(ReservationRepo::list(&self.pool, window.as_ref()).await?)
        })
        .await
    }

    async fn all_new_reservations(&self) -> Result<Vec<Reservation>, RepoError> {
        self.timed("all_new_reservations", async {
            Ok(ReservationRepo::list_new(&self.pool).await?)
        })
        .await
    }

    async fn get_reservation_by_id(&self, id: DbId) -> Result<Reservation, RepoError> {
        self.timed("get_reservation_by_id", async {
            ReservationRepo::find_by_id(&self.pool, id)
                .await?
                .ok_or_else(|| RepoError::not_found("Reservation", id))
        })
        .await
    }

    async fn update_reservation(
        &self,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<(), RepoError> {
        self.timed("update_reservation", async {
            if ReservationRepo::update(&self.pool, id, input).await? {
                Ok(())
            } else {
                Err(RepoError::not_found("Reservation", id))
            }
        })
        .await
    }

    async fn delete_reservation(&self, id: DbId) -> Result<(), RepoError> {
        self.timed("delete_reservation", async {
            if ReservationRepo::delete(&self.pool, id).await? {
                Ok(())
            } else {
                Err(RepoError::not_found("Reservation", id))
            }
        })
        .await
    }

    async fn update_processed(&self, id: DbId, processed: bool) -> Result<(), RepoError> {
        self.timed("update_processed", async {
            if ReservationRepo::set_processed(&self.pool, id, processed).await? {
                Ok(())
            } else {
                Err(RepoError::not_found("Reservation", id))
            }
        })
        .await
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, RepoError> {
        self.timed("create_user", async {
            Ok(UserRepo::create(&self.pool, input).await?)
        })
        .await
    }

    async fn get_user_by_id(&self, id: DbId) -> Result<User, RepoError> {
        self.timed("get_user_by_id", async {
            UserRepo::find_by_id(&self.pool, id)
                .await?
                .ok_or_else(|| RepoError::not_found("User", id))
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.timed("find_user_by_email", async {
            Ok(UserRepo::find_by_email(&self.pool, email).await?)
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        self.timed("list_users", async { Ok(UserRepo::list(&self.pool).await?) })
            .await
    }

    async fn delete_user(&self, id: DbId) -> Result<(), RepoError> {
        self.timed("delete_user", async {
            if UserRepo::delete(&self.pool, id).await? {
                Ok(())
            } else {
                Err(RepoError::not_found("User", id))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bookings_core::forms::GuestDetails;
    use chrono::NaiveDate;
    use sqlx::postgres::PgPoolOptions;
    use tokio::net::TcpListener;

    use super::*;

    /// Accepts connections and never answers the startup handshake.
    async fn stalled_server() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    async fn stalled_repo(op_timeout: Duration) -> PgBookingRepository {
        let addr = stalled_server().await;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy(&format!("postgres://bookings:bookings@{addr}/bookings"))
            .unwrap();
        PgBookingRepository::with_timeout(pool, op_timeout)
    }

    #[tokio::test]
    async fn stalled_read_surfaces_timeout() {
        let op_timeout = Duration::from_millis(200);
        let repo = stalled_repo(op_timeout).await;

        let started = std::time::Instant::now();
        assert_matches!(repo.all_rooms().await, Err(RepoError::Timeout(t)) if t == op_timeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stalled_commit_surfaces_timeout() {
        let op_timeout = Duration::from_millis(200);
        let repo = stalled_repo(op_timeout).await;
        let stay = StayDates::new(
            NaiveDate::from_ymd_opt(2050, 12, 17).unwrap(),
            NaiveDate::from_ymd_opt(2050, 12, 18).unwrap(),
        )
        .unwrap();
        let guest = GuestDetails {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john@smith.com".into(),
            phone: "555-555-5555".into(),
        };

        assert_matches!(
            repo.commit_booking(&NewReservation::new(&guest, stay, 1)).await,
            Err(RepoError::Timeout(_))
        );
    }
}
