// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scriptable MIDI backend for tests.
//!
//! Stands in for the host MIDI subsystem: tests feed raw messages
//! into whatever callbacks are currently connected and observe
//! open/close traffic to check that no handle leaks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::backend::{InputConnection, MessageCallback, MidiBackend, PortSelector};
use crate::error::MapperError;

/// In-memory [`MidiBackend`] double.
///
/// Supports several simultaneous connections so capture probing can
/// run beside an active session, the way the real transport allows.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    ports: Vec<String>,
    callbacks: HashMap<u64, MessageCallback>,
    next_id: u64,
    opened: usize,
    closed: usize,
}

impl MockBackend {
    pub fn new(ports: Vec<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                ports,
                ..MockState::default()
            })),
        }
    }

    /// Backend exposing a single named port.
    pub fn with_port(name: &str) -> Self {
        Self::new(vec![name.to_string()])
    }

    /// Deliver a raw message to every connected callback, as the host
    /// transport would on message arrival.
    pub fn feed(&self, raw: &[u8]) {
        let mut state = self.state.lock().unwrap();
        for callback in state.callbacks.values_mut() {
            callback(raw);
        }
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> usize {
        self.state.lock().unwrap().callbacks.len()
    }

    /// Total connections opened so far.
    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    /// Total connections closed so far.
    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }
}

impl MidiBackend for MockBackend {
    fn ports(&self) -> Vec<(usize, String)> {
        self.state
            .lock()
            .unwrap()
            .ports
            .iter()
            .cloned()
            .enumerate()
            .collect()
    }

    fn connect(
        &self,
        selector: &PortSelector,
        on_message: MessageCallback,
    ) -> Result<Box<dyn InputConnection>, MapperError> {
        let mut state = self.state.lock().unwrap();
        let ports: Vec<(usize, String)> = state.ports.iter().cloned().enumerate().collect();
        let (_, name) = selector.resolve(&ports)?;

        let id = state.next_id;
        state.next_id += 1;
        state.callbacks.insert(id, on_message);
        state.opened += 1;

        Ok(Box::new(MockConnection {
            id,
            name,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    id: u64,
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl InputConnection for MockConnection {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn close(self: Box<Self>) {
        let mut state = self.state.lock().unwrap();
        state.callbacks.remove(&self.id);
        state.closed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_feed_reaches_connected_callback() {
        let backend = MockBackend::with_port("Mock Pad");
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        let conn = backend
            .connect(
                &PortSelector::First,
                Box::new(move |raw| {
                    let _ = tx.send(raw.to_vec());
                }),
            )
            .unwrap();
        assert_eq!(conn.port_name(), "Mock Pad");

        backend.feed(&[0x90, 60, 100]);
        assert_eq!(rx.recv().unwrap(), vec![0x90, 60, 100]);

        conn.close();
        backend.feed(&[0x90, 60, 0]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_open_close_accounting() {
        let backend = MockBackend::with_port("Mock Pad");
        assert_eq!(backend.open_connections(), 0);

        let conn = backend
            .connect(&PortSelector::First, Box::new(|_| {}))
            .unwrap();
        assert_eq!(backend.open_connections(), 1);
        assert_eq!(backend.opened(), 1);

        conn.close();
        assert_eq!(backend.open_connections(), 0);
        assert_eq!(backend.closed(), 1);
    }

    #[test]
    fn test_connect_without_ports_fails() {
        let backend = MockBackend::default();
        let result = backend.connect(&PortSelector::First, Box::new(|_| {}));
        assert!(matches!(result, Err(MapperError::NoDevice(_))));
        assert_eq!(backend.opened(), 0);
    }
}
