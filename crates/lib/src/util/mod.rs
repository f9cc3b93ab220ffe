//! Shared utilities.
//!
//! Content hashing, time-derived identifiers, and test helpers.

pub mod hash;
pub mod id;

#[cfg(test)]
pub mod testutil;
