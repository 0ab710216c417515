//! A small clock abstraction (spec §9: "inject a small `Adapters` record
//! carrying model, checkpoint, and clock; this makes property-based tests
//! deterministic"). The Orchestrator's skill-file timestamps (UTC, minute
//! precision, spec §6) go through this rather than calling `Utc::now()`
//! directly, so tests can pin a fixed instant.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
