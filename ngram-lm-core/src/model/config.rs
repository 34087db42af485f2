use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Context size used when none is given.
pub const DEFAULT_CONTEXT_SIZE: usize = 2;

/// Training length from which counting is split across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 16;

fn default_context_size() -> usize {
	DEFAULT_CONTEXT_SIZE
}

fn default_parallel_threshold() -> usize {
	DEFAULT_PARALLEL_THRESHOLD
}

/// Configuration of an `NGramLanguageModel`.
///
/// # Responsibilities
/// - Hold the smoothing vocabulary size and the context size
/// - Hold the sequence length from which `fit` counts in parallel
/// - Reject unusable values through `validate` and the setters
///
/// # Invariants
/// - `vocabulary_size` is always > 0 once validated
/// - `parallel_threshold` is always > 0 once validated
///
/// Fields missing from a deserialized configuration take their defaults,
/// except `vocabulary_size` which is required. Deserialization does not
/// validate: the model does it on construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
	/// Assumed number of distinct possible tokens (smoothing only).
	vocabulary_size: usize,

	/// Maximum number of preceding tokens used as context.
	#[serde(default = "default_context_size")]
	context_size: usize,

	/// Training sequences at least this long are counted in parallel.
	#[serde(default = "default_parallel_threshold")]
	parallel_threshold: usize,
}

impl ModelConfig {
	/// Creates a configuration with the default context size.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `vocabulary_size` is 0.
	pub fn new(vocabulary_size: usize) -> Result<Self, ModelError> {
		let config = Self {
			vocabulary_size,
			context_size: DEFAULT_CONTEXT_SIZE,
			parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
		};
		config.validate()?;
		Ok(config)
	}

	/// Checks every field.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` naming the first bad field.
	pub fn validate(&self) -> Result<(), ModelError> {
		if self.vocabulary_size == 0 {
			return Err(ModelError::InvalidConfiguration("vocabulary_size must be > 0".to_owned()));
		}
		if self.parallel_threshold == 0 {
			return Err(ModelError::InvalidConfiguration("parallel_threshold must be > 0".to_owned()));
		}
		Ok(())
	}

	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary_size
	}

	pub fn context_size(&self) -> usize {
		self.context_size
	}

	/// Highest n-gram order counted by `fit` (`context_size + 1`).
	pub fn max_order(&self) -> usize {
		self.context_size + 1
	}

	pub fn parallel_threshold(&self) -> usize {
		self.parallel_threshold
	}

	/// Sets the vocabulary size.
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_vocabulary_size(&mut self, vocabulary_size: usize) -> Result<(), ModelError> {
		if vocabulary_size == 0 {
			return Err(ModelError::InvalidConfiguration("vocabulary_size must be > 0".to_owned()));
		}
		self.vocabulary_size = vocabulary_size;
		Ok(())
	}

	/// Sets the context size. Any value is valid, 0 gives a unigram model.
	pub fn set_context_size(&mut self, context_size: usize) {
		self.context_size = context_size;
	}

	/// Sets the parallel counting threshold.
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_parallel_threshold(&mut self, parallel_threshold: usize) -> Result<(), ModelError> {
		if parallel_threshold == 0 {
			return Err(ModelError::InvalidConfiguration("parallel_threshold must be > 0".to_owned()));
		}
		self.parallel_threshold = parallel_threshold;
		Ok(())
	}
}
