use thiserror::Error;

/// Typed error hierarchy for the portal's operations layer.
///
/// Store internals report through `anyhow`; everything crossing the
/// `portal`/`admin` boundary is converted into one of these variants so
/// callers can match on the failure class.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Json(String),

    #[error("{0}")]
    Other(String),
}

// ── From impls ─────────────────────────────────────────────────────────────

impl From<anyhow::Error> for PortalError {
    fn from(e: anyhow::Error) -> Self {
        PortalError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for PortalError {
    fn from(e: rusqlite::Error) -> Self {
        PortalError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        PortalError::Json(e.to_string())
    }
}

/// Allows `.map_err(|e| format!("…", e))?` to coerce into PortalError
/// without changing the call sites.
impl From<String> for PortalError {
    fn from(s: String) -> Self {
        PortalError::Other(s)
    }
}

/// Allows `.ok_or("literal string")?` to coerce into PortalError.
impl From<&str> for PortalError {
    fn from(s: &str) -> Self {
        PortalError::Other(s.to_string())
    }
}
