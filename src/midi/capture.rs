// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Single-shot MIDI key capture for configuration-time probing.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::backend::{MidiBackend, PortSelector};
use super::key::MidiKey;
use crate::error::MapperError;

/// Upper bound on each channel wait so the deadline is re-checked at
/// a steady cadence instead of busy-spinning.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Block until one MIDI message arrives on the selected port, then
/// return its key identity.
///
/// Opens its own short-lived connection, distinct from any live
/// session on the same backend, and closes it on every path out,
/// including timeout. Messages that do not parse as 3-byte note
/// messages are skipped and the wait keeps running until the
/// deadline.
pub fn capture_one(
    backend: &dyn MidiBackend,
    selector: &PortSelector,
    timeout: Duration,
) -> Result<MidiKey, MapperError> {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    let conn = backend.connect(
        selector,
        Box::new(move |raw| {
            let _ = tx.send(raw.to_vec());
        }),
    )?;
    debug!(port = conn.port_name(), "waiting for one MIDI key");

    let deadline = Instant::now() + timeout;
    let result = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break Err(MapperError::Timeout(timeout));
        }
        match rx.recv_timeout(remaining.min(POLL_INTERVAL)) {
            Ok(raw) => match MidiKey::parse(&raw) {
                Ok(key) => break Ok(key),
                Err(err) => trace!(%err, "skipping unparseable message during capture"),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break Err(MapperError::Backend(
                    "capture connection dropped".to_string(),
                ));
            }
        }
    };

    // The handle is released whether the wait succeeded or not.
    conn.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::mock::MockBackend;
    use std::thread;

    #[test]
    fn test_capture_returns_first_key() {
        let backend = MockBackend::with_port("Mock Pad");

        let feeder = backend.clone();
        let handle = thread::spawn(move || {
            for _ in 0..5 {
                thread::sleep(Duration::from_millis(20));
                feeder.feed(&[0x90, 64, 33]);
            }
        });

        let key = capture_one(&backend, &PortSelector::First, Duration::from_secs(2)).unwrap();
        assert_eq!(key, MidiKey::new(0x90, 64, 33));
        handle.join().unwrap();

        assert_eq!(backend.open_connections(), 0);
    }

    #[test]
    fn test_capture_zero_timeout_releases_handle() {
        let backend = MockBackend::with_port("Mock Pad");

        let result = capture_one(&backend, &PortSelector::First, Duration::ZERO);
        assert!(matches!(result, Err(MapperError::Timeout(_))));

        // Timed out, but the connection was still opened and closed.
        assert_eq!(backend.opened(), 1);
        assert_eq!(backend.closed(), 1);
        assert_eq!(backend.open_connections(), 0);
    }

    #[test]
    fn test_capture_skips_malformed_messages() {
        let backend = MockBackend::with_port("Mock Pad");

        let feeder = backend.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            feeder.feed(&[0xF8]);
            feeder.feed(&[0x90, 60, 100]);
        });

        let key = capture_one(&backend, &PortSelector::First, Duration::from_secs(2)).unwrap();
        assert_eq!(key, MidiKey::new(0x90, 60, 100));
        handle.join().unwrap();
    }

    #[test]
    fn test_capture_without_device_fails() {
        let backend = MockBackend::default();
        let result = capture_one(&backend, &PortSelector::First, Duration::from_millis(10));
        assert!(matches!(result, Err(MapperError::NoDevice(_))));
        assert_eq!(backend.opened(), 0);
    }
}
