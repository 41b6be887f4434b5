//! Hydration Tests
//!
//! End-to-end tests across the wirestate crates:
//! - Round trips for every property kind
//! - Rule-based projection of entity properties
//! - Entity references: unsaved entities, null slots, dirty data
//! - Error paths and the permissive sidecar


mod entities;
mod errors;
mod projection;
mod round_trip;
