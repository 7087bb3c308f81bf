//! Cache statistics

/// Hit/miss counters and size of an [`InMemoryCache`](crate::InMemoryCache)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
	pub hits: u64,
	pub misses: u64,
	pub entry_count: u64,
	/// Sum of the encoded value sizes in bytes
	pub memory_usage: u64,
}

impl CacheStatistics {
	pub fn total_requests(&self) -> u64 {
		self.hits + self.misses
	}

	/// Fraction of reads served from the cache (0.0 to 1.0)
	///
	/// # Examples
	///
	/// ```
	/// use pagetree_cache::CacheStatistics;
	///
	/// let stats = CacheStatistics {
	///     hits: 3,
	///     misses: 1,
	///     ..Default::default()
	/// };
	/// assert_eq!(stats.hit_rate(), 0.75);
	/// ```
	pub fn hit_rate(&self) -> f64 {
		match self.total_requests() {
			0 => 0.0,
			total => self.hits as f64 / total as f64,
		}
	}
}
