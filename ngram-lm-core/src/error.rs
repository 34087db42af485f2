use std::fmt;

/// Errors returned by the language model.
///
/// Unseen tokens, unseen contexts and short or empty training sequences are
/// not errors: smoothing handles them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
	/// The configuration is unusable (ex. `vocabulary_size == 0`).
	InvalidConfiguration(String),
	/// A query was issued before any call to `fit`.
	ModelNotFit,
}

impl fmt::Display for ModelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ModelError::InvalidConfiguration(reason) => write!(f, "Invalid configuration: {}", reason),
			ModelError::ModelNotFit => write!(f, "Model must be fit before it can be queried"),
		}
	}
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_messages() {
		let err = ModelError::InvalidConfiguration("vocabulary_size must be > 0".to_owned());
		assert_eq!(err.to_string(), "Invalid configuration: vocabulary_size must be > 0");
		assert_eq!(ModelError::ModelNotFit.to_string(), "Model must be fit before it can be queried");
	}

	#[test]
	fn test_boxes_as_std_error() {
		let boxed: Box<dyn std::error::Error> = Box::new(ModelError::ModelNotFit);
		assert!(boxed.to_string().contains("fit"));
	}
}
