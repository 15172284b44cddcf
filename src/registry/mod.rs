//! Drop-zone registry orchestrator.
//!
//! Zones publish their measured geometry here and every zone controller
//! hit-tests against it. Implementation lives in the private `core` module.

mod core;

pub use self::core::{DropZoneRegistry, Registration, Remeasure, ZoneId, ZoneRecord};
