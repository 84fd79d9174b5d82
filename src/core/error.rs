//! Error taxonomy shared by the scheduling and account services.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// A referenced event, invitee, token or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to view or mutate the resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Input was rejected, nothing was written
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl PlannerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

impl From<rusqlite::Error> for PlannerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.into())
    }
}
