//! Configuration access and diagnostics.
//!
//! The option parser never touches a settings file itself; it consumes
//! already-tokenized values through [`ConfigSource`]. Hosts with a real
//! settings store implement the trait; [`TableConfig`] is a small in-memory
//! implementation backed by raw strings, used by tests and embedders.
//!
//! Malformed option values are never errors. They fall back to documented
//! defaults and are reported through the [`Diagnostics`] sink.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::Color;

/// Typed, defaulted access to configuration values, keyed by section and
/// option name.
pub trait ConfigSource {
    fn read_string(&self, section: &str, key: &str, default: &str) -> String;
    fn read_bool(&self, section: &str, key: &str, default: bool) -> bool;
    fn read_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn read_float(&self, section: &str, key: &str, default: f64) -> f64;
    fn read_color(&self, section: &str, key: &str, default: Color) -> Color;

    /// Read a list of floats. An absent or malformed list reads as empty.
    fn read_floats(&self, section: &str, key: &str) -> Vec<f32>;
}

/// Sink for recoverable configuration problems.
///
/// `context` identifies where the value came from (the section name);
/// `message` names the offending option and value. Never fatal.
pub trait Diagnostics {
    fn log_error(&self, context: &str, message: &str);
}

/// Diagnostics sink forwarding to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn log_error(&self, context: &str, message: &str) {
        log::warn!("[{context}] {message}");
    }
}

/// Diagnostics sink that records every event, for tests and embedding hosts
/// that surface configuration problems in their own UI.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: RefCell<Vec<(String, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, String)> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log_error(&self, context: &str, message: &str) {
        self.events
            .borrow_mut()
            .push((context.to_string(), message.to_string()));
    }
}

/// In-memory [`ConfigSource`] over raw string values.
///
/// Values are stored exactly as a settings file would hold them and parsed
/// on read, so the typed accessors behave like a real config parser:
/// unparseable values fall back to the supplied default.
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    values: HashMap<(String, String), String>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value, replacing any previous one.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> &mut Self {
        self.values
            .insert((section.to_string(), key.to_string()), value.to_string());
        self
    }

    fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(section.to_string(), key.to_string()))
            .map(String::as_str)
    }
}

impl ConfigSource for TableConfig {
    fn read_string(&self, section: &str, key: &str, default: &str) -> String {
        self.raw(section, key).unwrap_or(default).to_string()
    }

    fn read_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.raw(section, key) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }

    fn read_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.raw(section, key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(default)
    }

    fn read_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.raw(section, key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(default)
    }

    fn read_color(&self, section: &str, key: &str, default: Color) -> Color {
        self.raw(section, key)
            .and_then(parse_color)
            .unwrap_or(default)
    }

    fn read_floats(&self, section: &str, key: &str) -> Vec<f32> {
        let Some(raw) = self.raw(section, key) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for token in raw.split([',', ';']) {
            match token.trim().parse::<f32>() {
                Ok(v) => out.push(v),
                Err(_) => return Vec::new(),
            }
        }
        out
    }
}

/// Parse a color from `"R,G,B"` / `"R,G,B,A"` decimal form or `"RRGGBB"` /
/// `"RRGGBBAA"` hex form. Alpha defaults to 255 when omitted.
fn parse_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();

    if raw.contains(',') {
        let mut channels = [0u8; 4];
        channels[3] = 255;
        let mut count = 0;
        for token in raw.split(',') {
            if count >= 4 {
                return None;
            }
            channels[count] = token.trim().parse().ok()?;
            count += 1;
        }
        if count < 3 {
            return None;
        }
        return Some(Color::rgba(channels[0], channels[1], channels[2], channels[3]));
    }

    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(1)?, byte(2)?)),
        8 => Some(Color::rgba(byte(0)?, byte(1)?, byte(2)?, byte(3)?)),
        _ => None,
    }
}
