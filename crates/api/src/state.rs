use std::sync::Arc;

use bookings_db::BookingRepository;
use bookings_events::MailQueue;

use crate::config::ServerConfig;
use crate::render::Renderer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Availability queries and reservation persistence.
    pub repo: Arc<dyn BookingRepository>,
    pub config: Arc<ServerConfig>,
    /// Hand-off to the background mail dispatcher.
    pub mail: MailQueue,
    pub renderer: Arc<dyn Renderer>,
}
