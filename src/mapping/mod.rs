// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! User-defined MIDI-to-keyboard mapping table.
//!
//! The table is rebuilt from the configuration pairs each time a
//! session is activated; an active session holds a frozen snapshot
//! and never sees later edits. On disk it is a flat JSON object from
//! canonical MIDI key strings to output key names.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::midi::MidiKey;

/// On-disk form of the table: a flat JSON object from canonical MIDI
/// key strings to output key names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct MappingFile {
    entries: HashMap<String, String>,
}

/// Mapping from MIDI key identity to output keyboard key name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: HashMap<MidiKey, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one mapping. Re-inserting the same MIDI key replaces
    /// the previous output key (last write wins).
    pub fn insert(&mut self, key: MidiKey, output: impl Into<String>) {
        self.entries.insert(key, output.into());
    }

    /// Look up the output key for a MIDI key. Velocity plays no part
    /// in the lookup.
    pub fn get(&self, key: &MidiKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&MidiKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Build a table from `(midi, output)` string pairs, e.g. straight
    /// from configuration rows. Pairs whose MIDI side does not parse
    /// (blank rows included) are skipped with a warning rather than
    /// failing the whole build.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        let mut table = Self::new();
        for (midi, output) in pairs {
            match midi.as_ref().parse::<MidiKey>() {
                Ok(key) => table.insert(key, output),
                Err(err) => {
                    warn!(midi = midi.as_ref(), %err, "skipping unparseable mapping pair")
                }
            }
        }
        table
    }

    /// Parse the flat JSON object form, `{"status,note": "key", ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: MappingFile =
            serde_json::from_str(json).context("Failed to parse mapping JSON")?;
        Ok(Self::from_pairs(file.entries))
    }

    /// Serialize to the flat JSON object form.
    pub fn to_json(&self) -> Result<String> {
        let file = MappingFile {
            entries: self
                .entries
                .iter()
                .map(|(key, output)| (key.canonical(), output.clone()))
                .collect(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize mapping table")
    }

    /// Load a mapping file written by [`MappingTable::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read mapping file: {:?}", path.as_ref()))?;
        Self::from_json(&contents)
    }

    /// Load a mapping file, treating a missing file as an empty table
    /// (a fresh installation has nothing saved yet). Any other
    /// failure, unreadable file or malformed JSON, is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(contents) => Self::from_json(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to read mapping file: {:?}", path.as_ref())
            }),
        }
    }

    /// Save the table to a mapping file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write mapping file: {:?}", path.as_ref()))
    }
}
