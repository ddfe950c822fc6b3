// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Output side: synthesized keyboard key events.
//!
//! This module provides:
//! - [`KeyActuator`], the seam over the host input-injection facility
//! - [`EnigoActuator`], the `enigo`-backed implementation
//! - [`dispatch`], the per-message translation step

pub mod dispatch;

pub use dispatch::dispatch;

use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{anyhow, Context, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::{debug, warn};

/// Performs the actual key press/release on the host keyboard.
///
/// Implementations are called from the MIDI input callback thread and
/// must not block it.
pub trait KeyActuator: Send {
    /// Hold down the named key.
    fn press(&mut self, key: &str) -> Result<()>;

    /// Release the named key.
    fn release(&mut self, key: &str) -> Result<()>;
}

/// Translate a configured key name into an `enigo` key.
///
/// Single characters map to their unicode key; longer names cover the
/// common specials (case-insensitive).
pub fn parse_key_name(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Unicode(c.to_ascii_lowercase()));
    }

    let key = match name.to_ascii_lowercase().as_str() {
        "space" => Key::Space,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "shift" => Key::Shift,
        "ctrl" | "control" => Key::Control,
        "alt" => Key::Alt,
        "meta" | "cmd" | "win" => Key::Meta,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => return None,
    };
    Some(key)
}

enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// `enigo`-backed [`KeyActuator`].
///
/// The `Enigo` handle lives on a dedicated worker thread fed through
/// a channel, so `press`/`release` only enqueue and the MIDI callback
/// never waits on the platform injection call.
pub struct EnigoActuator {
    tx: Sender<KeyEvent>,
}

impl EnigoActuator {
    /// Spawn the worker and connect to the host input facility.
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<KeyEvent>();
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), String>>();

        thread::Builder::new()
            .name("key-actuator".to_string())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.to_string()));
                        return;
                    }
                };

                while let Ok(event) = rx.recv() {
                    let result = match event {
                        KeyEvent::Press(key) => enigo.key(key, Direction::Press),
                        KeyEvent::Release(key) => enigo.key(key, Direction::Release),
                    };
                    if let Err(err) = result {
                        warn!(%err, "key injection failed");
                    }
                }
                debug!("key actuator worker stopped");
            })
            .context("Failed to spawn key actuator thread")?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("key actuator worker died during startup"))?
            .map_err(|err| anyhow!("failed to initialize input injection: {}", err))?;

        Ok(Self { tx })
    }

    fn send(&self, event: KeyEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| anyhow!("key actuator worker is gone"))
    }
}

impl KeyActuator for EnigoActuator {
    fn press(&mut self, key: &str) -> Result<()> {
        let key = parse_key_name(key).ok_or_else(|| anyhow!("unknown key name: {:?}", key))?;
        self.send(KeyEvent::Press(key))
    }

    fn release(&mut self, key: &str) -> Result<()> {
        let key = parse_key_name(key).ok_or_else(|| anyhow!("unknown key name: {:?}", key))?;
        self.send(KeyEvent::Release(key))
    }
}
