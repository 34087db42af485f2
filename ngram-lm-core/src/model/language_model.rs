use std::hash::Hash;

use super::config::{DEFAULT_CONTEXT_SIZE, ModelConfig};
use super::distribution::Distribution;
use super::frequency_table::FrequencyTable;
use super::vocabulary::{TokenId, Vocabulary};
use crate::error::ModelError;

/// Everything `fit` produces. Replaced as a whole on every `fit`.
#[derive(Clone, Debug)]
struct Fitted<T> {
	vocabulary: Vocabulary<T>,
	table: FrequencyTable,
}

/// N-gram language model with Laplace (add-one) smoothing.
///
/// The model counts every n-gram of order 1 ..= `context_size + 1` of a
/// training sequence and estimates, for a context of up to `context_size`
/// tokens, the probability of the next token:
///
/// `p(token | context) = (count(context ++ [token]) + 1) / (count(context) + vocabulary_size)`
///
/// where `count(context)` only includes occurrences followed by a token, so
/// that probabilities over a vocabulary of `vocabulary_size` tokens sum to 1.
///
/// # Responsibilities
/// - Build the frequency table from a single training sequence (`fit`)
/// - Produce a smoothed distribution for a context (`query`)
/// - Score whole sequences (`log_likelihood`, `perplexity`)
///
/// # Invariants
/// - `config` is valid (`vocabulary_size > 0`)
/// - `fitted` is `None` until the first `fit`, then holds the counts of the last training sequence only
///
/// # Concurrency
/// `fit` takes `&mut self` and queries take `&self`, so a fit can never race
/// with a query. To retrain while serving queries, fit a new model and swap it in.
#[derive(Clone, Debug)]
pub struct NGramLanguageModel<T> {
	config: ModelConfig,
	fitted: Option<Fitted<T>>,
}

impl<T: Eq + Hash + Clone> NGramLanguageModel<T> {
	/// Creates an unfit model.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `vocabulary_size` is 0.
	pub fn new(vocabulary_size: usize, context_size: usize) -> Result<Self, ModelError> {
		let mut config = ModelConfig::new(vocabulary_size)?;
		config.set_context_size(context_size);
		Self::from_config(config)
	}

	/// Creates an unfit model with the default context size (2).
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `vocabulary_size` is 0.
	pub fn with_vocabulary_size(vocabulary_size: usize) -> Result<Self, ModelError> {
		Self::new(vocabulary_size, DEFAULT_CONTEXT_SIZE)
	}

	/// Creates an unfit model from a configuration.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if the configuration does not validate.
	pub fn from_config(config: ModelConfig) -> Result<Self, ModelError> {
		config.validate()?;
		Ok(Self { config, fitted: None })
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn vocabulary_size(&self) -> usize {
		self.config.vocabulary_size()
	}

	pub fn context_size(&self) -> usize {
		self.config.context_size()
	}

	/// Returns `true` once `fit` has been called.
	pub fn is_fit(&self) -> bool {
		self.fitted.is_some()
	}

	/// Fits the model on a training sequence.
	///
	/// Previous counts are discarded: fitting `a` then `b` is the same as
	/// fitting `b` alone. The sequence may be empty or shorter than the
	/// highest order; orders longer than the sequence get no counts.
	pub fn fit<I>(&mut self, sequence: I)
	where
		I: IntoIterator<Item = T>,
	{
		self.fitted = None;

		let mut vocabulary = Vocabulary::new();
		let ids: Vec<TokenId> = sequence.into_iter().map(|token| vocabulary.intern(token)).collect();
		let table = FrequencyTable::build(&ids, self.config.max_order(), self.config.parallel_threshold());

		if vocabulary.len() > self.vocabulary_size() {
			log::warn!(
				"Observed {} distinct tokens but vocabulary_size is {}, probabilities will not sum to 1",
				vocabulary.len(),
				self.vocabulary_size()
			);
		}
		log::debug!(
			"Fitted {} tokens ({} distinct) into {} n-grams of order 1..={}",
			ids.len(),
			vocabulary.len(),
			table.len(),
			self.config.max_order()
		);

		self.fitted = Some(Fitted { vocabulary, table });
	}

	fn fitted(&self) -> Result<&Fitted<T>, ModelError> {
		self.fitted.as_ref().ok_or(ModelError::ModelNotFit)
	}

	/// Keeps the last `context_size` tokens of `context`.
	fn truncate<'c>(&self, context: &'c [T]) -> &'c [T] {
		&context[context.len().saturating_sub(self.context_size())..]
	}

	/// Returns the smoothed next-token distribution for `context`.
	///
	/// Only the last `context_size` tokens of `context` are used; a shorter
	/// context is used whole and an empty one falls back to unigram counts.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn query(&self, context: &[T]) -> Result<Distribution<'_, T>, ModelError> {
		let fitted = self.fitted()?;
		Ok(Distribution::new(
			&fitted.vocabulary,
			&fitted.table,
			self.truncate(context),
			self.vocabulary_size(),
		))
	}

	/// Shorthand for `query(context)?.probability(token)`.
	pub fn probability(&self, context: &[T], token: &T) -> Result<f64, ModelError> {
		Ok(self.query(context)?.probability(token))
	}

	/// Shorthand for `query(context)?.log_probability(token)` (natural log).
	pub fn log_probability(&self, context: &[T], token: &T) -> Result<f64, ModelError> {
		Ok(self.query(context)?.log_probability(token))
	}

	/// Returns the raw number of occurrences of `ngram` in the training sequence.
	///
	/// N-grams longer than `context_size + 1` were never counted and return 0.
	/// The empty n-gram returns the training length.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn count(&self, ngram: &[T]) -> Result<usize, ModelError> {
		let fitted = self.fitted()?;
		Ok(fitted
			.vocabulary
			.resolve(ngram)
			.map_or(0, |ids| fitted.table.count(&ids)))
	}

	/// Returns the natural-log likelihood of `sequence`.
	///
	/// Each token is scored against the tokens preceding it in `sequence`
	/// (truncated to `context_size`), and the log-probabilities are summed.
	/// An empty sequence has a log-likelihood of 0.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn log_likelihood(&self, sequence: &[T]) -> Result<f64, ModelError> {
		self.fitted()?;
		let mut total = 0.0;
		for (i, token) in sequence.iter().enumerate() {
			total += self.query(&sequence[..i])?.log_probability(token);
		}
		Ok(total)
	}

	/// Returns the perplexity of `sequence`: `exp(-log_likelihood / len)`.
	///
	/// An empty sequence has a perplexity of 1.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn perplexity(&self, sequence: &[T]) -> Result<f64, ModelError> {
		let log_likelihood = self.log_likelihood(sequence)?;
		if sequence.is_empty() {
			return Ok(1.0);
		}
		Ok((-log_likelihood / sequence.len() as f64).exp())
	}

	/// Number of distinct tokens seen by the last `fit`.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn observed_tokens(&self) -> Result<usize, ModelError> {
		Ok(self.fitted()?.vocabulary.len())
	}

	/// Number of distinct n-grams (all orders) counted by the last `fit`.
	///
	/// # Errors
	/// Returns `ModelNotFit` if `fit` has never been called.
	pub fn distinct_ngrams(&self) -> Result<usize, ModelError> {
		Ok(self.fitted()?.table.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(s: &str) -> Vec<char> {
		s.chars().collect()
	}

	fn assert_close(actual: f64, expected: f64) {
		assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
	}

	#[test]
	fn test_new_validates() {
		assert!(matches!(
			NGramLanguageModel::<char>::new(0, 2),
			Err(ModelError::InvalidConfiguration(_))
		));
		let model = NGramLanguageModel::<char>::with_vocabulary_size(26).unwrap();
		assert_eq!(model.context_size(), 2);
		assert_eq!(model.vocabulary_size(), 26);
		assert!(!model.is_fit());
	}

	#[test]
	fn test_query_before_fit_fails() {
		let model = NGramLanguageModel::<char>::new(3, 1).unwrap();
		assert_eq!(model.query(&['a']).unwrap_err(), ModelError::ModelNotFit);
		assert_eq!(model.count(&['a']).unwrap_err(), ModelError::ModelNotFit);
		assert_eq!(model.log_likelihood(&[]).unwrap_err(), ModelError::ModelNotFit);
		assert_eq!(model.perplexity(&[]).unwrap_err(), ModelError::ModelNotFit);
	}

	#[test]
	fn test_context_ending_training_sums_to_one() {
		let mut model = NGramLanguageModel::new(3, 1).unwrap();
		model.fit("abcabcabc".chars());

		// the last 'c' has no successor, so it is not part of the denominator
		let distribution = model.query(&['c']).unwrap();
		assert_eq!(model.count(&['c']).unwrap(), 3);
		assert_eq!(distribution.context_count(), 2);
		assert_eq!(distribution.denominator(), 5);
		assert_close(distribution.probability(&'a'), 3.0 / 5.0);
		let sum: f64 = ['a', 'b', 'c'].iter().map(|token| distribution.probability(token)).sum();
		assert_close(sum, 1.0);
	}

	#[test]
	fn test_huge_vocabulary_saturates_denominator() {
		let mut model = NGramLanguageModel::new(usize::MAX, 1).unwrap();
		model.fit("abab".chars());

		let distribution = model.query(&['a']).unwrap();
		assert_eq!(distribution.denominator(), usize::MAX);
		let p = distribution.probability(&'b');
		assert!(p > 0.0 && p <= 1.0);
	}

	#[test]
	fn test_abc_bigrams() {
		let mut model = NGramLanguageModel::new(3, 1).unwrap();
		model.fit("abcabcabc".chars());

		assert_eq!(model.count(&['a', 'b']).unwrap(), 3);
		assert_eq!(model.count(&['b', 'c']).unwrap(), 3);
		assert_eq!(model.count(&['c', 'a']).unwrap(), 2);
		assert_eq!(model.count(&['a', 'b', 'c']).unwrap(), 0);
		assert_close(model.probability(&['a'], &'b').unwrap(), 4.0 / 6.0);
		assert_eq!(model.observed_tokens().unwrap(), 3);
		assert_eq!(model.distinct_ngrams().unwrap(), 6);
	}

	#[test]
	fn test_context_is_truncated() {
		let mut model = NGramLanguageModel::new(3, 1).unwrap();
		model.fit("abcabcabc".chars());

		let long = model.query(&chars("cccca")).unwrap();
		let short = model.query(&['a']).unwrap();
		assert_eq!(long.denominator(), short.denominator());
		assert_close(long.probability(&'b'), short.probability(&'b'));
	}

	#[test]
	fn test_unseen_tokens_are_smoothed() {
		let mut model = NGramLanguageModel::new(5, 2).unwrap();
		model.fit("abcabcabc".chars());
		assert_close(model.probability(&['x', 'y'], &'z').unwrap(), 1.0 / 5.0);
		assert!(model.probability(&['a', 'b'], &'a').unwrap() > 0.0);
	}

	#[test]
	fn test_zero_context_size_is_unigram() {
		let mut model = NGramLanguageModel::new(4, 0).unwrap();
		model.fit("aab".chars());
		// (2 + 1) / (3 + 4)
		assert_close(model.probability(&['b', 'b'], &'a').unwrap(), 3.0 / 7.0);
		assert_eq!(model.count(&['a', 'a']).unwrap(), 0);
	}

	#[test]
	fn test_refit_replaces_counts() {
		let mut model = NGramLanguageModel::new(3, 1).unwrap();
		model.fit("aaaa".chars());
		model.fit("bcbc".chars());
		assert_eq!(model.count(&['a']).unwrap(), 0);
		assert_eq!(model.count(&['b', 'c']).unwrap(), 2);
		assert_eq!(model.observed_tokens().unwrap(), 2);
	}

	#[test]
	fn test_log_likelihood_sums_positions() {
		let mut model = NGramLanguageModel::new(3, 1).unwrap();
		model.fit("abcabcabc".chars());

		let sequence = chars("abca");
		let expected = model.log_probability(&[], &'a').unwrap()
			+ model.log_probability(&['a'], &'b').unwrap()
			+ model.log_probability(&['b'], &'c').unwrap()
			+ model.log_probability(&['c'], &'a').unwrap();
		assert_close(model.log_likelihood(&sequence).unwrap(), expected);
		assert_close(model.log_likelihood(&[]).unwrap(), 0.0);
	}

	#[test]
	fn test_perplexity() {
		let mut model = NGramLanguageModel::new(4, 2).unwrap();
		model.fit(Vec::<char>::new());
		assert_close(model.perplexity(&chars("abcd")).unwrap(), 4.0);
		assert_close(model.perplexity(&[]).unwrap(), 1.0);

		model.fit("abcabcabc".chars());
		let seen = model.perplexity(&chars("abcabc")).unwrap();
		let unseen = model.perplexity(&chars("cbacba")).unwrap();
		assert!(seen < unseen);
	}
}
