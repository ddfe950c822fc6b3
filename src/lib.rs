// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI-to-keyboard event translation.
//!
//! Translates incoming MIDI note events into synthesized keyboard
//! key presses and releases according to a user-defined mapping.
//! A [`MidiKey`] identifies a key by its (status, note) pair with
//! velocity excluded; a [`MappingTable`] maps those identities to
//! output key names; a [`PortSession`] owns one open input port and
//! runs [`dispatch`] for every incoming message against a frozen
//! snapshot of the table; [`capture_one`] is the synchronous probe
//! used to discover a key's identity before mapping it.

pub mod control;
pub mod error;
pub mod mapping;
pub mod midi;
pub mod session;

pub use control::{dispatch, EnigoActuator, KeyActuator};
pub use error::MapperError;
pub use mapping::MappingTable;
pub use midi::{capture_one, MidiBackend, MidiKey, MidirBackend, MockBackend, PortSelector};
pub use session::{MidiMapper, PortSession, SharedActuator};
