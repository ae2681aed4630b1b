//! Identifier and timestamp sources.
//!
//! The canvas never calls `Uuid::new_v4()` or reads the system clock directly
//! for entities it creates itself; it goes through these traits so tests can
//! inject deterministic values.

use std::cell::Cell;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Produces opaque, unique string identifiers.
pub trait IdGenerator: fmt::Debug {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        fresh_id()
    }
}

/// Counter-based ids (`"<prefix>-1"`, `"<prefix>-2"`, ...), for tests and fixtures.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{}", self.prefix, n)
    }
}

/// A fresh random id, used by the node and edge factories.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// ISO-8601 timestamp source for document metadata.
pub trait Clock: fmt::Debug {
    fn now_iso8601(&self) -> String;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso8601(&self) -> String {
        OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|e| {
            log::warn!("Failed to format timestamp: {}", e);
            String::new()
        })
    }
}

/// Always returns the same timestamp.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_iso8601(&self) -> String {
        self.0.clone()
    }
}
