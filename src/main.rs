// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use midimap::{capture_one, midi, MapperError, MappingTable, MidiMapper, MidirBackend, PortSelector};

/// How long the capture probe waits for a key before giving up.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

fn print_usage() {
    println!("midimap - translate MIDI note events into keyboard key presses");
    println!();
    println!("Usage: midimap [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-ports              List available MIDI input ports");
    println!("  --capture [PORT]          Wait for one MIDI key and print its identity");
    println!("  --run FILE [PORT] [SECS]  Activate the mapping in FILE (flat JSON object),");
    println!("                            optionally on input port PORT, for SECS seconds");
    println!("                            (default: until interrupted)");
    println!("  --help                    Show this help message");
}

/// A bare number selects a port by index, anything else matches by
/// name; no argument means the first available port.
fn selector_from_arg(arg: Option<&String>) -> PortSelector {
    match arg {
        None => PortSelector::First,
        Some(s) => match s.parse::<usize>() {
            Ok(index) => PortSelector::Index(index),
            Err(_) => PortSelector::Name(s.clone()),
        },
    }
}

fn capture(selector: &PortSelector) -> Result<()> {
    let backend = MidirBackend::new();
    println!("Press a MIDI key...");
    match capture_one(&backend, selector, CAPTURE_TIMEOUT) {
        Ok(key) => println!("Captured MIDI key: {}", key),
        Err(MapperError::NoDevice(reason)) => println!("No MIDI device found. ({})", reason),
        Err(MapperError::Timeout(_)) => println!("No MIDI message received."),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn run(path: &str, selector: &PortSelector, seconds: Option<u64>) -> Result<()> {
    // A missing file just means nothing has been saved yet.
    let table = MappingTable::load_or_default(path)?;
    if table.is_empty() {
        println!("Warning: mapping file has no entries");
    }

    let mut mapper = MidiMapper::new()?;
    match mapper.activate_table(table, selector) {
        Ok(()) => {}
        Err(MapperError::NoDevice(reason)) => {
            println!("No MIDI device found. ({})", reason);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }
    println!(
        "Listening on [ {} ] ...",
        mapper.port_name().unwrap_or("unknown")
    );

    match seconds {
        Some(secs) => thread::sleep(Duration::from_secs(secs)),
        None => loop {
            thread::sleep(Duration::from_secs(60));
        },
    }

    mapper.deactivate();
    println!("Mapping deactivated.");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--list-ports") => midi::print_ports(),
        Some("--capture") => capture(&selector_from_arg(args.get(2)))?,
        Some("--run") => match args.get(2) {
            Some(path) => {
                let selector = selector_from_arg(args.get(3));
                let seconds = args.get(4).and_then(|s| s.parse().ok());
                run(path, &selector, seconds)?;
            }
            None => {
                print_usage();
                std::process::exit(1);
            }
        },
        Some("--help") | None => print_usage(),
        Some(other) => {
            println!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
