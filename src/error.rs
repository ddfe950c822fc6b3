// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error taxonomy for the event-translation core.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the translation engine.
///
/// Malformed messages are dropped inside the live callback path and
/// never reach a caller as an error; the other variants are returned
/// from the session, capture, and activation entry points.
#[derive(Debug, Error)]
pub enum MapperError {
    /// Raw MIDI message too short or otherwise unusable.
    #[error("invalid MIDI message: {0}")]
    InvalidMessage(String),

    /// No MIDI input port available, or the selected port does not exist.
    #[error("no MIDI device: {0}")]
    NoDevice(String),

    /// Single-shot capture exceeded its wait bound.
    #[error("no MIDI message received within {0:?}")]
    Timeout(Duration),

    /// A session is already active; it must be stopped before another
    /// one can start.
    #[error("a session is already active on [{port}]")]
    SessionConflict { port: String },

    /// Failure reported by the underlying MIDI transport.
    #[error("MIDI backend error: {0}")]
    Backend(String),
}

/// Result type for translation-engine operations.
pub type Result<T> = std::result::Result<T, MapperError>;
