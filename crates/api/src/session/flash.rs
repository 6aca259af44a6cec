//! One-shot notices carried across a redirect.
//!
//! A notice is written before redirecting and removed by the next page
//! render, so it is shown exactly once.

use serde::Serialize;
use tower_sessions::Session;

use crate::error::AppResult;

const FLASH_KEY: &str = "flash";
const WARNING_KEY: &str = "warning";
const ERROR_KEY: &str = "error";

/// Notices consumed from the session for the page being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notices {
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

/// Informational notice ("Changes saved").
pub async fn put_flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_KEY, message).await?;
    Ok(())
}

pub async fn put_warning(session: &Session, message: &str) -> AppResult<()> {
    session.insert(WARNING_KEY, message).await?;
    Ok(())
}

/// Error notice shown after a failed step.
pub async fn put_error(session: &Session, message: &str) -> AppResult<()> {
    session.insert(ERROR_KEY, message).await?;
    Ok(())
}

/// Remove and return every pending notice.
pub async fn take_notices(session: &Session) -> AppResult<Notices> {
    Ok(Notices {
        flash: session.remove::<String>(FLASH_KEY).await?,
        warning: session.remove::<String>(WARNING_KEY).await?,
        error: session.remove::<String>(ERROR_KEY).await?,
    })
}
