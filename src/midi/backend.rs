// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Abstraction over the host MIDI subsystem.
//!
//! The session and capture code talk to the host through the
//! [`MidiBackend`] trait so they can run against the real `midir`
//! transport or the scriptable mock interchangeably.

use midir::{Ignore, MidiInput};
use tracing::debug;

use crate::error::MapperError;

/// Callback invoked by the transport for every raw incoming message.
/// Runs on the transport's own thread, not the caller's.
pub type MessageCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Selects which input port to open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PortSelector {
    /// First available port.
    #[default]
    First,
    /// Port at a fixed enumeration index.
    Index(usize),
    /// First port whose display name contains the given substring.
    Name(String),
}

impl PortSelector {
    /// Resolve this selector against an enumeration of `(index, name)`
    /// pairs. An empty enumeration always fails: there is nothing to
    /// open.
    pub fn resolve(&self, ports: &[(usize, String)]) -> Result<(usize, String), MapperError> {
        if ports.is_empty() {
            return Err(MapperError::NoDevice(
                "no MIDI input ports available".to_string(),
            ));
        }
        match self {
            PortSelector::First => Ok(ports[0].clone()),
            PortSelector::Index(index) => ports.get(*index).cloned().ok_or_else(|| {
                MapperError::NoDevice(format!(
                    "port index {} out of range ({} ports)",
                    index,
                    ports.len()
                ))
            }),
            PortSelector::Name(name) => ports
                .iter()
                .find(|(_, port_name)| port_name.contains(name))
                .cloned()
                .ok_or_else(|| MapperError::NoDevice(format!("no port matching {:?}", name))),
        }
    }
}

/// An open input connection.
///
/// Closing consumes the handle, so a connection can never be left
/// half-closed or closed twice.
pub trait InputConnection: Send {
    /// Display name of the connected port.
    fn port_name(&self) -> &str;

    /// Close the connection. Terminal: the callback is not invoked
    /// again once this returns.
    fn close(self: Box<Self>);
}

/// Host MIDI subsystem: port enumeration and connection.
pub trait MidiBackend: Send + Sync {
    /// Enumerate input ports as `(index, display name)` pairs.
    ///
    /// A host without a working MIDI subsystem yields an empty list,
    /// never an error, so callers stay usable with zero devices.
    fn ports(&self) -> Vec<(usize, String)>;

    /// Open the selected port and attach `on_message`, which the
    /// transport invokes asynchronously for every incoming message
    /// until the returned connection is closed.
    fn connect(
        &self,
        selector: &PortSelector,
        on_message: MessageCallback,
    ) -> Result<Box<dyn InputConnection>, MapperError>;
}

/// `midir`-backed implementation of [`MidiBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MidirBackend;

impl MidirBackend {
    pub fn new() -> Self {
        MidirBackend
    }
}

impl MidiBackend for MidirBackend {
    fn ports(&self) -> Vec<(usize, String)> {
        let midi_in = match MidiInput::new("midimap-list") {
            Ok(midi_in) => midi_in,
            Err(_) => return Vec::new(),
        };
        midi_in
            .ports()
            .iter()
            .enumerate()
            .map(|(i, port)| {
                let name = midi_in
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown {}", i));
                (i, name)
            })
            .collect()
    }

    fn connect(
        &self,
        selector: &PortSelector,
        mut on_message: MessageCallback,
    ) -> Result<Box<dyn InputConnection>, MapperError> {
        let mut midi_in = MidiInput::new("midimap-in")
            .map_err(|e| MapperError::Backend(e.to_string()))?;
        midi_in.ignore(Ignore::None);

        let ports = midi_in.ports();
        let names: Vec<(usize, String)> = ports
            .iter()
            .enumerate()
            .map(|(i, port)| {
                let name = midi_in
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown {}", i));
                (i, name)
            })
            .collect();
        let (index, name) = selector.resolve(&names)?;

        let conn = midi_in
            .connect(
                &ports[index],
                "midimap-input",
                move |_timestamp, message, _| on_message(message),
                (),
            )
            .map_err(|e| MapperError::Backend(e.to_string()))?;
        debug!(port = %name, "MIDI input connected");

        Ok(Box::new(MidirConnection { conn, name }))
    }
}

struct MidirConnection {
    conn: midir::MidiInputConnection<()>,
    name: String,
}

impl InputConnection for MidirConnection {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn close(self: Box<Self>) {
        let MidirConnection { conn, name } = *self;
        conn.close();
        debug!(port = %name, "MIDI input closed");
    }
}
