use std::collections::HashMap;
use std::hash::Hash;

/// Integer identifier of an interned token.
pub(crate) type TokenId = usize;

/// Interning table mapping training tokens to dense integer ids.
///
/// Ids are assigned from 0 in first-seen order. Tokens absent from the
/// training sequence have no id, so any n-gram containing one has a count
/// of 0 without touching the frequency table.
#[derive(Clone, Debug)]
pub(crate) struct Vocabulary<T> {
	ids: HashMap<T, TokenId>,
}

impl<T: Eq + Hash + Clone> Vocabulary<T> {
	pub fn new() -> Self {
		Self { ids: HashMap::new() }
	}

	/// Returns the id of `token`, assigning the next free one if needed.
	pub fn intern(&mut self, token: T) -> TokenId {
		let next = self.ids.len();
		*self.ids.entry(token).or_insert(next)
	}

	/// Returns the id of a known token.
	pub fn get(&self, token: &T) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	/// Resolves every token, or `None` as soon as one is unknown.
	pub fn resolve(&self, tokens: &[T]) -> Option<Vec<TokenId>> {
		tokens.iter().map(|token| self.get(token)).collect()
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_intern_assigns_dense_ids() {
		let mut vocabulary = Vocabulary::new();
		assert_eq!(vocabulary.intern('b'), 0);
		assert_eq!(vocabulary.intern('a'), 1);
		assert_eq!(vocabulary.intern('b'), 0);
		assert_eq!(vocabulary.len(), 2);
	}

	#[test]
	fn test_resolve_fails_on_unknown_token() {
		let mut vocabulary = Vocabulary::new();
		for token in ["the", "cat"] {
			vocabulary.intern(token);
		}
		assert_eq!(vocabulary.resolve(&["cat", "the"]), Some(vec![1, 0]));
		assert_eq!(vocabulary.resolve(&["cat", "dog"]), None);
		assert_eq!(vocabulary.resolve(&[]), Some(vec![]));
	}
}
