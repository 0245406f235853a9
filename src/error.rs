// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Sanity client SDK.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, SanityError>`. Configuration and listener
//! registration fail synchronously; everything produced by a transport, an
//! HTTP requester, or an event handler is surfaced to the caller as-is.

use thiserror::Error;

/// Boxed error type carried by [`SanityError::External`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for Sanity client operations.
#[derive(Error, Debug)]
pub enum SanityError {
    /// The client configuration is missing a required field or is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A listener was registered or removed for an event the client never emits.
    #[error("Unknown event type \"{0}\"")]
    UnknownEvent(String),

    /// `remove_listener` was given a handler that is not registered for the event.
    #[error("Event handler given is not registered for this event")]
    HandlerNotRegistered,

    /// Client-side validation failed before the request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token was rejected or lacks access to the project.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An underlying HTTP / network transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API returned an HTTP error status with a message body.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A failure raised by a document transport or an event handler.
    ///
    /// Display and source are forwarded to the wrapped error, which can be
    /// recovered with [`SanityError::downcast_external`].
    #[error(transparent)]
    External(BoxError),
}

impl SanityError {
    /// Wrap an arbitrary collaborator error.
    pub fn external<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        SanityError::External(err.into())
    }

    /// Borrow the wrapped collaborator error as `E`, if that is what it is.
    pub fn downcast_external<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            SanityError::External(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Crate-level result alias using [`SanityError`].
pub type Result<T> = std::result::Result<T, SanityError>;
