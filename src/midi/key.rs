// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Canonical identity of a MIDI key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::MapperError;

/// A single key on a MIDI device.
///
/// Identity is the (status byte, note number) pair only. Velocity is
/// carried along for the press/release decision but is excluded from
/// equality and hashing: two messages for the same key struck at
/// different strengths are the same key.
#[derive(Debug, Clone, Copy)]
pub struct MidiKey {
    status: u8,
    note: u8,
    velocity: u8,
}

impl MidiKey {
    pub fn new(status: u8, note: u8, velocity: u8) -> Self {
        Self {
            status,
            note,
            velocity,
        }
    }

    /// Parse a raw MIDI message of the form (status, note, velocity).
    /// Bytes beyond the third are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, MapperError> {
        if data.len() < 3 {
            return Err(MapperError::InvalidMessage(format!(
                "expected at least 3 bytes, got {}",
                data.len()
            )));
        }
        Ok(Self::new(data[0], data[1], data[2]))
    }

    /// Status byte (message type nibble plus channel).
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Note number (0-127 on conforming devices).
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Strike strength (0-127).
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Whether this message signals a key release. Velocity 0 is the
    /// release convention here, independent of the status byte.
    pub fn is_release(&self) -> bool {
        self.velocity == 0
    }

    /// Canonical `"<status>,<note>"` form, used for lookup and as the
    /// key in persisted mapping files.
    pub fn canonical(&self) -> String {
        format!("{},{}", self.status, self.note)
    }
}

impl fmt::Display for MidiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.status, self.note)
    }
}

impl FromStr for MidiKey {
    type Err = MapperError;

    /// Accepts the canonical `"status,note"` form as well as the full
    /// `"status,note,velocity"` form. A missing velocity reads as 0;
    /// fields beyond the third are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() < 2 {
            return Err(MapperError::InvalidMessage(format!(
                "expected \"status,note[,velocity]\", got {:?}",
                s
            )));
        }

        let parse_field = |field: &str| {
            field.trim().parse::<u8>().map_err(|_| {
                MapperError::InvalidMessage(format!("not a MIDI data byte: {:?}", field))
            })
        };

        let status = parse_field(fields[0])?;
        let note = parse_field(fields[1])?;
        let velocity = match fields.get(2) {
            Some(field) => parse_field(field)?,
            None => 0,
        };

        Ok(Self::new(status, note, velocity))
    }
}

impl PartialEq for MidiKey {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.note == other.note
    }
}

impl Eq for MidiKey {}

impl Hash for MidiKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.status.hash(state);
        self.note.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::status::{NOTE_OFF, NOTE_ON};
    use std::collections::HashSet;

    #[test]
    fn test_parse_raw_message() {
        let key = MidiKey::parse(&[NOTE_ON, 60, 100]).unwrap();
        assert_eq!(key.status(), NOTE_ON);
        assert_eq!(key.note(), 60);
        assert_eq!(key.velocity(), 100);
        assert!(!key.is_release());
    }

    #[test]
    fn test_parse_short_message_fails() {
        let err = MidiKey::parse(&[NOTE_ON, 60]).unwrap_err();
        assert!(matches!(err, MapperError::InvalidMessage(_)));
        assert!(MidiKey::parse(&[]).is_err());
    }

    #[test]
    fn test_extra_bytes_ignored() {
        let key = MidiKey::parse(&[NOTE_ON, 60, 100, 7, 7]).unwrap();
        assert_eq!(key, MidiKey::new(NOTE_ON, 60, 100));
    }

    #[test]
    fn test_velocity_excluded_from_identity() {
        let soft = MidiKey::parse(&[NOTE_ON, 60, 1]).unwrap();
        let hard = MidiKey::parse(&[NOTE_ON, 60, 127]).unwrap();
        assert_eq!(soft, hard);

        let mut set = HashSet::new();
        set.insert(soft);
        assert!(set.contains(&hard));
    }

    #[test]
    fn test_identity_distinguishes_status_and_note() {
        let base = MidiKey::new(NOTE_ON, 60, 100);
        assert_ne!(base, MidiKey::new(NOTE_ON, 61, 100));
        assert_ne!(base, MidiKey::new(NOTE_ON | 1, 60, 100));
    }

    #[test]
    fn test_canonical_form() {
        let key = MidiKey::new(144, 60, 100);
        assert_eq!(key.canonical(), "144,60");
        assert_eq!(key.to_string(), "144,60");
    }

    #[test]
    fn test_canonical_round_trip() {
        let key = MidiKey::parse(&[144, 60, 100]).unwrap();
        let reparsed: MidiKey = key.canonical().parse().unwrap();
        assert_eq!(reparsed, key);
        assert_eq!(reparsed.canonical(), key.canonical());
    }

    #[test]
    fn test_from_str_with_velocity() {
        let key: MidiKey = "144,60,100".parse().unwrap();
        assert_eq!(key.velocity(), 100);
        assert!(!key.is_release());

        let release: MidiKey = "144,60,0".parse().unwrap();
        assert!(release.is_release());
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("".parse::<MidiKey>().is_err());
        assert!("144".parse::<MidiKey>().is_err());
        assert!("x,60".parse::<MidiKey>().is_err());
        assert!("144,999".parse::<MidiKey>().is_err());
    }

    #[test]
    fn test_release_convention() {
        let off = MidiKey::parse(&[NOTE_ON, 60, 0]).unwrap();
        assert!(off.is_release());
        // The status byte does not decide press/release, velocity does.
        let odd = MidiKey::parse(&[NOTE_OFF, 60, 64]).unwrap();
        assert!(!odd.is_release());
    }
}
