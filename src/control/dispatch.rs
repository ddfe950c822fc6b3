// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-event translation from MIDI messages to key actions.

use tracing::{trace, warn};

use super::KeyActuator;
use crate::mapping::MappingTable;
use crate::midi::MidiKey;

/// Translate one raw MIDI message against a mapping table.
///
/// Malformed messages are dropped so the live session survives them;
/// unmapped keys are a deliberate no-op. For mapped keys, velocity 0
/// releases the output key and anything else presses it. The table is
/// never mutated and no state is kept between calls, so concurrent
/// invocations are safe.
pub fn dispatch(raw: &[u8], table: &MappingTable, actuator: &mut dyn KeyActuator) {
    let key = match MidiKey::parse(raw) {
        Ok(key) => key,
        Err(err) => {
            trace!(%err, "dropping malformed MIDI message");
            return;
        }
    };

    let Some(output) = table.get(&key) else {
        trace!(key = %key, "no mapping for MIDI key");
        return;
    };

    let result = if key.is_release() {
        actuator.release(output)
    } else {
        actuator.press(output)
    };
    if let Err(err) = result {
        warn!(key = %key, output, %err, "key actuation failed");
    }
}
