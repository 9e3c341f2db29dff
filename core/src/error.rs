//! Error types for the PetFriends client.
//!
//! # Design
//! Service error statuses (400/403/404) are NOT errors here: they come back
//! as ordinary `ApiResponse` values for the caller to assert on. Only
//! failures that prevent a response from existing, or a typed extraction
//! that does not match the body, land in `ApiError`.

use std::path::PathBuf;

use crate::http::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP status (connection, TLS, ...).
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The local photo file could not be read.
    #[error("cannot read photo {}: {source}", path.display())]
    PhotoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The normalized body did not have the shape the caller asked for.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
