// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Live translation session: one open MIDI port bound to one frozen
//! mapping table.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use crate::control::{dispatch, EnigoActuator, KeyActuator};
use crate::error::MapperError;
use crate::mapping::MappingTable;
use crate::midi::backend::{InputConnection, MidiBackend, MidirBackend, PortSelector};
use crate::midi::capture::capture_one;
use crate::midi::MidiKey;

/// Actuator shared between the owner and the transport callback
/// thread.
pub type SharedActuator = Arc<Mutex<Box<dyn KeyActuator>>>;

enum SessionState {
    /// No device open.
    Idle,
    /// Device open, callback attached, mapping snapshot frozen.
    Active { conn: Box<dyn InputConnection> },
}

/// Lifecycle of a single open MIDI input connection.
///
/// Owns at most one active connection at a time; a second `start`
/// while active is rejected and the running session is untouched.
pub struct PortSession {
    backend: Arc<dyn MidiBackend>,
    state: SessionState,
}

impl PortSession {
    pub fn new(backend: Arc<dyn MidiBackend>) -> Self {
        Self {
            backend,
            state: SessionState::Idle,
        }
    }

    /// Open the selected port and translate every incoming message
    /// against a frozen snapshot of `table` until [`PortSession::stop`]
    /// is called.
    ///
    /// The snapshot is taken here: edits to the mapping after this
    /// returns do not reach the session, re-activation picks them up.
    /// Any failure to acquire the device leaves the session `Idle`.
    pub fn start(
        &mut self,
        selector: &PortSelector,
        table: MappingTable,
        actuator: SharedActuator,
    ) -> Result<(), MapperError> {
        if let SessionState::Active { conn } = &self.state {
            return Err(MapperError::SessionConflict {
                port: conn.port_name().to_string(),
            });
        }

        let entries = table.len();
        let snapshot = Arc::new(table);
        let conn = self.backend.connect(
            selector,
            Box::new(move |raw| {
                // Runs on the transport's callback thread.
                if let Ok(mut actuator) = actuator.lock() {
                    dispatch(raw, &snapshot, actuator.as_mut());
                }
            }),
        )?;

        info!(port = conn.port_name(), entries, "translation session active");
        self.state = SessionState::Active { conn };
        Ok(())
    }

    /// Close the device and return to `Idle`. No events are delivered
    /// once this returns. Calling on an idle session is a no-op.
    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Active { conn } => {
                let port = conn.port_name().to_string();
                conn.close();
                info!(port = %port, "translation session stopped");
            }
            SessionState::Idle => {}
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Name of the currently open port, if any.
    pub fn port_name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { conn } => Some(conn.port_name()),
            SessionState::Idle => None,
        }
    }

    /// Enumerate input ports. Read-only and independent of session
    /// state; zero devices is an empty list, not an error.
    pub fn list_ports(&self) -> Vec<(usize, String)> {
        self.backend.ports()
    }
}

impl Drop for PortSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Outward-facing handle the configuration layer drives: activate and
/// deactivate translation, probe keys, enumerate ports.
pub struct MidiMapper {
    backend: Arc<dyn MidiBackend>,
    session: PortSession,
    actuator: SharedActuator,
}

impl MidiMapper {
    /// Mapper over the real MIDI subsystem and host keyboard.
    pub fn new() -> anyhow::Result<Self> {
        let actuator: SharedActuator = Arc::new(Mutex::new(Box::new(EnigoActuator::new()?)));
        Ok(Self::with_parts(Arc::new(MidirBackend::new()), actuator))
    }

    /// Mapper over explicit collaborators, for tests and embedders.
    pub fn with_parts(backend: Arc<dyn MidiBackend>, actuator: SharedActuator) -> Self {
        let session = PortSession::new(Arc::clone(&backend));
        Self {
            backend,
            session,
            actuator,
        }
    }

    /// Build a fresh table from the configured pairs and start a
    /// session on the selected port.
    pub fn activate<I, A, B>(&mut self, pairs: I, selector: &PortSelector) -> Result<(), MapperError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        self.activate_table(MappingTable::from_pairs(pairs), selector)
    }

    /// Start a session consuming an already-built table.
    pub fn activate_table(
        &mut self,
        table: MappingTable,
        selector: &PortSelector,
    ) -> Result<(), MapperError> {
        self.session
            .start(selector, table, Arc::clone(&self.actuator))
    }

    /// Stop the active session, if any.
    pub fn deactivate(&mut self) {
        self.session.stop();
    }

    /// Synchronously capture one MIDI key on a separate short-lived
    /// connection. The live session, if any, keeps running.
    pub fn capture_key(
        &self,
        selector: &PortSelector,
        timeout: Duration,
    ) -> Result<MidiKey, MapperError> {
        capture_one(self.backend.as_ref(), selector, timeout)
    }

    /// Enumerate input ports as `(index, display name)` pairs.
    pub fn list_ports(&self) -> Vec<(usize, String)> {
        self.backend.ports()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Name of the port the active session is listening on, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.session.port_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::mock::MockBackend;
    use anyhow::Result;

    struct NullActuator;

    impl KeyActuator for NullActuator {
        fn press(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
        fn release(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    fn null_actuator() -> SharedActuator {
        Arc::new(Mutex::new(Box::new(NullActuator)))
    }

    fn session(backend: &MockBackend) -> PortSession {
        PortSession::new(Arc::new(backend.clone()))
    }

    #[test]
    fn test_start_without_device_stays_idle() {
        let backend = MockBackend::default();
        let mut session = session(&backend);

        let result = session.start(&PortSelector::First, MappingTable::new(), null_actuator());
        assert!(matches!(result, Err(MapperError::NoDevice(_))));
        assert!(!session.is_active());
        assert_eq!(session.port_name(), None);
    }

    #[test]
    fn test_start_then_stop_closes_handle() {
        let backend = MockBackend::with_port("Mock Pad");
        let mut session = session(&backend);

        session
            .start(&PortSelector::First, MappingTable::new(), null_actuator())
            .unwrap();
        assert!(session.is_active());
        assert_eq!(session.port_name(), Some("Mock Pad"));
        assert_eq!(backend.open_connections(), 1);

        session.stop();
        assert!(!session.is_active());
        assert_eq!(backend.open_connections(), 0);
        assert_eq!(backend.closed(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let backend = MockBackend::with_port("Mock Pad");
        let mut session = session(&backend);

        session.stop();
        session
            .start(&PortSelector::First, MappingTable::new(), null_actuator())
            .unwrap();
        session.stop();
        session.stop();
        assert_eq!(backend.closed(), 1);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let backend = MockBackend::with_port("Mock Pad");
        let mut session = session(&backend);

        session
            .start(&PortSelector::First, MappingTable::new(), null_actuator())
            .unwrap();
        let second =
            session.start(&PortSelector::First, MappingTable::new(), null_actuator());
        assert!(matches!(
            second,
            Err(MapperError::SessionConflict { .. })
        ));

        // The running session is untouched by the rejected attempt.
        assert!(session.is_active());
        assert_eq!(backend.open_connections(), 1);
    }

    #[test]
    fn test_restart_after_stop_succeeds() {
        let backend = MockBackend::with_port("Mock Pad");
        let mut session = session(&backend);

        session
            .start(&PortSelector::First, MappingTable::new(), null_actuator())
            .unwrap();
        session.stop();
        session
            .start(&PortSelector::First, MappingTable::new(), null_actuator())
            .unwrap();
        assert!(session.is_active());
        assert_eq!(backend.opened(), 2);
    }

    #[test]
    fn test_drop_closes_connection() {
        let backend = MockBackend::with_port("Mock Pad");
        {
            let mut session = session(&backend);
            session
                .start(&PortSelector::First, MappingTable::new(), null_actuator())
                .unwrap();
        }
        assert_eq!(backend.open_connections(), 0);
    }

    #[test]
    fn test_list_ports_independent_of_state() {
        let backend = MockBackend::with_port("Mock Pad");
        let session = session(&backend);
        assert_eq!(session.list_ports(), vec![(0, "Mock Pad".to_string())]);

        let empty = MockBackend::default();
        assert!(PortSession::new(Arc::new(empty)).list_ports().is_empty());
    }
}
