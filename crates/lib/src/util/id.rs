//! Time-derived identifiers.
//!
//! Ids are decimal milliseconds since the Unix epoch. Within one process every id
//! is strictly greater than the previous one, even when the clock stalls or steps
//! backwards, so two calls never collide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_ID: AtomicU64 = AtomicU64::new(0);

fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

/// Next process-unique, monotonically increasing timestamp id.
pub fn next_id() -> u64 {
  let now = now_millis();
  let mut last = LAST_ID.load(Ordering::Relaxed);
  loop {
    let candidate = now.max(last + 1);
    match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
      Ok(_) => return candidate,
      Err(actual) => last = actual,
    }
  }
}

/// [`next_id`] rendered as a numeric string.
pub fn timestamp_id() -> String {
  next_id().to_string()
}
