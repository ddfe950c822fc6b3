// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input layer.
//!
//! This module provides:
//! - [`MidiKey`], the canonical identity of an incoming note message
//! - [`MidiBackend`], the seam over the host MIDI subsystem, with a
//!   `midir` implementation and a scriptable mock
//! - [`capture_one`], the blocking single-shot key probe

pub mod backend;
pub mod capture;
pub mod key;
pub mod mock;

pub use backend::{InputConnection, MessageCallback, MidiBackend, MidirBackend, PortSelector};
pub use capture::capture_one;
pub use key::MidiKey;
pub use mock::MockBackend;

/// MIDI status byte constants (upper nibble; lower nibble is the
/// channel).
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
}

/// Print all available MIDI input ports to stdout.
pub fn print_ports() {
    let ports = MidirBackend::new().ports();
    if ports.is_empty() {
        println!("No MIDI input ports found.");
    } else {
        println!("Available MIDI input ports:");
        for (i, name) in ports {
            println!("  [{}] {}", i, name);
        }
    }
}
