use std::hash::Hash;

use rand::Rng;

use super::frequency_table::FrequencyTable;
use super::vocabulary::{TokenId, Vocabulary};

/// Smoothed next-token distribution for one context.
///
/// Returned by `NGramLanguageModel::query`. It borrows the model, so it
/// cannot outlive the frequency table it was computed from nor coexist
/// with a new `fit`.
///
/// For a candidate `token`:
/// `p(token) = (count(context ++ [token]) + 1) / (context_count + vocabulary_size)`
///
/// # Invariants
/// - `denominator >= vocabulary_size > 0`
/// - every probability is strictly positive
#[derive(Clone, Debug)]
pub struct Distribution<'m, T> {
	vocabulary: &'m Vocabulary<T>,
	table: &'m FrequencyTable,

	/// Ids of the truncated context, `None` if it contains an unseen token.
	context: Option<Vec<TokenId>>,

	/// Number of times the context was observed followed by a token.
	context_count: usize,

	/// `context_count + vocabulary_size`, saturating at `usize::MAX`
	denominator: usize,
}

impl<'m, T: Eq + Hash + Clone> Distribution<'m, T> {
	pub(crate) fn new(
		vocabulary: &'m Vocabulary<T>,
		table: &'m FrequencyTable,
		context: &[T],
		vocabulary_size: usize,
	) -> Self {
		let context = vocabulary.resolve(context);
		let context_count = context.as_deref().map_or(0, |ids| table.context_count(ids));
		Self {
			vocabulary,
			table,
			context,
			context_count,
			denominator: context_count.saturating_add(vocabulary_size),
		}
	}

	/// Number of times the context was observed followed by a token.
	pub fn context_count(&self) -> usize {
		self.context_count
	}

	/// Smoothing denominator shared by every token of this distribution.
	pub fn denominator(&self) -> usize {
		self.denominator
	}

	/// Returns how many times `token` followed the context in training.
	pub fn count(&self, token: &T) -> usize {
		let (Some(context), Some(id)) = (&self.context, self.vocabulary.get(token)) else {
			return 0;
		};
		let mut ngram = Vec::with_capacity(context.len() + 1);
		ngram.extend_from_slice(context);
		ngram.push(id);
		self.table.count(&ngram)
	}

	/// Add-one numerator of `token`.
	fn numerator(&self, token: &T) -> usize {
		self.count(token) + 1
	}

	/// Returns the smoothed probability of `token`, in `(0, 1]`.
	pub fn probability(&self, token: &T) -> f64 {
		self.numerator(token) as f64 / self.denominator as f64
	}

	/// Returns the natural logarithm of `probability(token)`.
	///
	/// Prefer this form when summing over long sequences.
	pub fn log_probability(&self, token: &T) -> f64 {
		(self.numerator(token) as f64).ln() - (self.denominator as f64).ln()
	}

	/// Picks one of `candidates` at random, weighted by its smoothed probability.
	///
	/// All candidates share the same denominator, so the integer numerators
	/// are used as weights:
	/// - an O(n) pass computes the numerators
	/// - a cumulative subtraction selects a bucket
	///
	/// Returns `None` if `candidates` is empty.
	pub fn sample<'c, R: Rng>(&self, candidates: &'c [T], rng: &mut R) -> Option<&'c T> {
		if candidates.is_empty() {
			return None;
		}

		let weights: Vec<usize> = candidates.iter().map(|token| self.numerator(token)).collect();
		let total: usize = weights.iter().sum();

		let mut r = rng.random_range(0..total);
		for (token, weight) in candidates.iter().zip(&weights) {
			if r < *weight {
				return Some(token);
			}
			r -= weight;
		}

		// Unreachable since r < total
		candidates.last()
	}

	/// Returns the candidate with the highest probability.
	///
	/// The first one wins on ties. Returns `None` if `candidates` is empty.
	pub fn most_likely<'c>(&self, candidates: &'c [T]) -> Option<&'c T> {
		let mut best: Option<(&'c T, usize)> = None;
		for token in candidates {
			let numerator = self.numerator(token);
			if best.is_none_or(|(_, highest)| numerator > highest) {
				best = Some((token, numerator));
			}
		}
		best.map(|(token, _)| token)
	}
}
