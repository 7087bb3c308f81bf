//! Stored cache entry

use std::time::{Duration, SystemTime};

/// Encoded value with an optional expiry instant
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
	pub(crate) value: Vec<u8>,
	pub(crate) expires_at: Option<SystemTime>,
}

impl CacheEntry {
	pub(crate) fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
		Self {
			value,
			expires_at: ttl.map(|ttl| SystemTime::now() + ttl),
		}
	}

	pub(crate) fn is_expired(&self) -> bool {
		self.expires_at
			.is_some_and(|expires_at| SystemTime::now() > expires_at)
	}

	/// Whole seconds left before expiry, `None` for entries that never expire
	pub(crate) fn ttl_remaining(&self) -> Option<u64> {
		self.expires_at.map(|expires_at| {
			expires_at
				.duration_since(SystemTime::now())
				.map_or(0, |left| left.as_secs())
		})
	}
}
