//! TTL cache of ranked search results, bounded by LRU eviction. Expiry is
//! checked lazily on lookup; there is no background sweeper.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};

use rove_domain::CandidateLocation;

struct CacheEntry {
	results: Vec<CandidateLocation>,
	inserted_at: OffsetDateTime,
	last_used: u64,
}

pub(crate) struct SearchCache {
	entries: HashMap<String, CacheEntry>,
	max_entries: usize,
	tick: u64,
}

/// Stable cache key for a query. Normalization (trim + lowercase) happens
/// before hashing so "Yoga " and "yoga" share an entry.
pub fn query_key(text: &str) -> String {
	let normalized = text.trim().to_lowercase();

	blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

impl SearchCache {
	pub(crate) fn new(max_entries: usize) -> Self {
		Self { entries: HashMap::new(), max_entries, tick: 0 }
	}

	pub(crate) fn get(
		&mut self,
		key: &str,
		ttl: Duration,
		now: OffsetDateTime,
	) -> Option<Vec<CandidateLocation>> {
		let expired = match self.entries.get(key) {
			Some(entry) => now - entry.inserted_at >= ttl,
			None => return None,
		};

		if expired {
			self.entries.remove(key);

			return None;
		}

		self.tick += 1;

		let tick = self.tick;
		let entry = self.entries.get_mut(key)?;

		entry.last_used = tick;

		Some(entry.results.clone())
	}

	pub(crate) fn put(&mut self, key: String, results: Vec<CandidateLocation>, now: OffsetDateTime) {
		self.tick += 1;

		if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
			self.evict_least_recent();
		}

		self.entries
			.insert(key, CacheEntry { results, inserted_at: now, last_used: self.tick });
	}

	pub(crate) fn clear(&mut self) {
		self.entries.clear();
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	fn evict_least_recent(&mut self) {
		let victim = self
			.entries
			.iter()
			.min_by_key(|(_, entry)| entry.last_used)
			.map(|(key, _)| key.clone());

		if let Some(key) = victim {
			self.entries.remove(&key);
		}
	}
}
