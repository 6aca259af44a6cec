//! The visitor's draft reservation, stored under a single session key.
//!
//! [`DraftStore`] is an extractor over the request's session. The draft is
//! serialized on every write and deserialized on every read; handlers work
//! on owned copies and write the new value back.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bookings_core::draft::DraftReservation;
use tower_sessions::Session;

use crate::error::AppResult;

/// Session key the draft lives under.
pub const DRAFT_KEY: &str = "reservation";

pub struct DraftStore(Session);

impl DraftStore {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn session(&self) -> &Session {
        &self.0
    }

    /// Replace the draft.
    pub async fn put(&self, draft: &DraftReservation) -> AppResult<()> {
        self.0.insert(DRAFT_KEY, draft).await?;
        Ok(())
    }

    /// The current draft, or `None` if there is none. An undecodable value
    /// is discarded and treated as absent.
    pub async fn get(&self) -> AppResult<Option<DraftReservation>> {
        match self.0.get::<DraftReservation>(DRAFT_KEY).await {
            Ok(draft) => Ok(draft),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable draft reservation");
                self.remove().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self) -> AppResult<()> {
        self.0.remove_value(DRAFT_KEY).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for DraftStore
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookings_core::dates::StayDates;
    use chrono::NaiveDate;
    use tower_sessions::MemoryStore;

    use super::*;

    fn draft() -> DraftReservation {
        DraftReservation::with_dates(
            StayDates::new(
                NaiveDate::from_ymd_opt(2050, 12, 17).unwrap(),
                NaiveDate::from_ymd_opt(2050, 12, 18).unwrap(),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn get_before_put_is_none() {
        let store = DraftStore::new(Session::new(None, Arc::new(MemoryStore::default()), None));
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_get_remove() {
        let store = DraftStore::new(Session::new(None, Arc::new(MemoryStore::default()), None));
        store.put(&draft()).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(draft()));

        store.remove().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_absent() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert(DRAFT_KEY, "not a draft").await.unwrap();

        let store = DraftStore::new(session);
        assert_eq!(store.get().await.unwrap(), None);
    }
}
