use std::collections::HashMap;
use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use super::vocabulary::TokenId;

/// Occurrence counts of every n-gram of a training sequence.
///
/// Keys are n-grams of interned token ids, of every order from 1 up to the
/// model's `max_order`. The empty n-gram (the "zero-gram", which occurs
/// before every token) is not stored in the map: its count is `total`.
///
/// ## Responsibilities:
/// - Count every sliding window of every order (sequentially or in parallel)
/// - Merge partial tables built from disjoint window start ranges
/// - Answer how many times a context was observed followed by a token
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - `tail` holds the last `max_order - 1` ids of the training sequence (fewer if it is shorter)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrequencyTable {
	/// Mapping from an n-gram to its number of occurrences.
	/// Example: { [0] => 3, [0, 1] => 3, [2, 0] => 2 }
	counts: HashMap<Box<[TokenId]>, usize>,

	/// Length of the training sequence.
	total: usize,

	/// Trailing ids of the training sequence.
	tail: Vec<TokenId>,
}

impl FrequencyTable {
	/// Counts every n-gram of order 1 ..= `max_order` in `ids`.
	///
	/// Sequences of at least `parallel_threshold` ids are split into chunks
	/// of window start positions counted on separate threads.
	pub fn build(ids: &[TokenId], max_order: usize, parallel_threshold: usize) -> Self {
		let mut table = if ids.len() >= parallel_threshold {
			Self::count_parallel(ids, max_order)
		} else {
			let mut table = Self::default();
			table.count_windows(ids, 0..ids.len(), max_order);
			table
		};

		let context_size = max_order.saturating_sub(1);
		table.total = ids.len();
		table.tail = ids[ids.len().saturating_sub(context_size)..].to_vec();
		table
	}

	/// Counts the windows of order 1 ..= `max_order` starting in `starts`.
	///
	/// Windows may run past `starts.end` but never past the end of `ids`.
	fn count_windows(&mut self, ids: &[TokenId], starts: Range<usize>, max_order: usize) {
		for start in starts {
			let longest = max_order.min(ids.len() - start);
			for n in 1..=longest {
				let window = &ids[start..start + n];
				if let Some(count) = self.counts.get_mut(window) {
					*count += 1;
				} else {
					self.counts.insert(window.into(), 1);
				}
			}
		}
	}

	/// Splits the window start positions into chunks, counts each chunk on
	/// its own thread and merges the partial tables as they arrive.
	///
	/// # Notes
	/// - Chunk count is `cpus * 8`.
	/// - Start ranges are disjoint, so every window is counted exactly once.
	fn count_parallel(ids: &[TokenId], max_order: usize) -> Self {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = ids.len().div_ceil(chunks).max(1);

		let mut table = Self::default();
		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk_start in (0..ids.len()).step_by(chunk_size) {
				let tx = tx.clone();
				let starts = chunk_start..(chunk_start + chunk_size).min(ids.len());

				scope.spawn(move || {
					let mut partial = FrequencyTable::default();
					log::trace!("Counting windows {}..{}", starts.start, starts.end);
					partial.count_windows(ids, starts, max_order);
					// The receiver lives until every sender is gone
					let _ = tx.send(partial);
				});
			}
			drop(tx);

			for partial in rx {
				table.merge(partial);
			}
		});
		table
	}

	/// Merges the counts of another table into this one.
	///
	/// Only the n-gram counts are summed, `total` and `tail` are left as is.
	pub fn merge(&mut self, other: FrequencyTable) {
		if self.counts.is_empty() {
			self.counts = other.counts;
			return;
		}
		for (ngram, count) in other.counts {
			*self.counts.entry(ngram).or_insert(0) += count;
		}
	}

	/// Returns the number of occurrences of `ngram`.
	///
	/// The empty n-gram occurs once before every token.
	pub fn count(&self, ngram: &[TokenId]) -> usize {
		if ngram.is_empty() {
			return self.total;
		}
		self.counts.get(ngram).copied().unwrap_or(0)
	}

	/// Returns how many times `context` was observed followed by a token.
	///
	/// This is the n-gram count of `context`, minus the final occurrence
	/// when the training sequence ends with it.
	pub fn context_count(&self, context: &[TokenId]) -> usize {
		if context.is_empty() {
			return self.total;
		}
		let observed = self.count(context);
		if self.tail.ends_with(context) {
			observed.saturating_sub(1)
		} else {
			observed
		}
	}

	/// Number of distinct n-grams (all orders).
	pub fn len(&self) -> usize {
		self.counts.len()
	}
}
