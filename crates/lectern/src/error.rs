//! Unified error surface of the facade.

use thiserror::Error;

/// Any error the facade can return.
///
/// Layer errors pass through transparently so callers can still match
/// on the specific kind; [`LecternError::Config`] is the facade's own,
/// raised when environment configuration doesn't parse.
#[derive(Debug, Error)]
pub enum LecternError {
    #[error(transparent)]
    Auth(#[from] lectern_auth::AuthError),

    #[error(transparent)]
    Api(#[from] lectern_api::ApiError),

    #[error(transparent)]
    Store(#[from] lectern_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}
