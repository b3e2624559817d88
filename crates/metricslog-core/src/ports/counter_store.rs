//! Counter store port (driven/secondary port)
//!
//! This module defines the interface to the persistent preference store that
//! holds stability counters between reporting cycles.
//!
//! ## Design Notes
//!
//! - Methods are synchronous: the store is already loaded in memory when a
//!   report is built, and no operation in a reporting cycle blocks on I/O.
//! - Reads of absent keys return the type's zero value (`0`, `None`), never
//!   an error. How and when the store is persisted is the adapter's concern.
//! - There is no atomicity beyond a single call. Callers must ensure only one
//!   reporting cycle drains the store at a time.

use serde_json::Value;

/// Port trait for the persistent counter store
pub trait ICounterStore {
    /// Reads an integer counter; absent keys read as 0
    fn get_int(&self, name: &str) -> i64;

    /// Writes an integer counter
    fn set_int(&mut self, name: &str, value: i64);

    /// Reads a string-encoded value, if present
    fn get_string(&self, name: &str) -> Option<String>;

    /// Reads a list value, if present
    ///
    /// Entries are dictionaries for the lists this crate consumes, but the
    /// store does not enforce that; consumers must skip malformed entries.
    fn get_list(&self, name: &str) -> Option<Vec<Value>>;

    /// Removes a value of any type
    fn clear(&mut self, name: &str);

    /// Reads an integer counter and resets it to 0 in the same call
    fn drain_int(&mut self, name: &str) -> i64 {
        let value = self.get_int(name);
        self.set_int(name, 0);
        value
    }
}
