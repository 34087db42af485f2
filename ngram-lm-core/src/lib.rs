//! Laplace-smoothed n-gram language model.
//!
//! This crate provides:
//! - Frequency counting of every n-gram order up to `context_size + 1`
//! - Add-one smoothed next-token distributions for any context
//! - Sequence scoring (log-likelihood, perplexity) and weighted sampling
//!
//! Tokens are opaque: any `Eq + Hash + Clone` type works (`char`, `String`,
//! integer ids...). Tokenization is up to the caller.
//!
//! ```
//! use ngram_lm_core::NGramLanguageModel;
//!
//! let mut model = NGramLanguageModel::new(3, 1)?;
//! model.fit("abcabcabc".chars());
//! let p = model.query(&['a'])?.probability(&'b');
//! assert!((p - 4.0 / 6.0).abs() < 1e-12);
//! # Ok::<(), ngram_lm_core::ModelError>(())
//! ```

/// Language model, its configuration and the distributions it produces.
pub mod model;

/// Error type shared by the crate.
pub mod error;

pub use error::ModelError;
pub use model::config::ModelConfig;
pub use model::distribution::Distribution;
pub use model::language_model::NGramLanguageModel;
