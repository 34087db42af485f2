//! Top-level module for the n-gram language model.
//!
//! This module provides:
//! - The Laplace-smoothed model itself (`NGramLanguageModel`)
//! - The distribution returned for a context (`Distribution`)
//! - Model configuration (`ModelConfig`)
//! - Internal n-gram counting (`FrequencyTable`) and token interning (`Vocabulary`)

/// Smoothed n-gram language model.
///
/// Handles fitting on a training sequence, context queries,
/// and whole-sequence scoring.
pub mod language_model;

/// Next-token distribution for a single context.
///
/// Exposes raw and log probabilities, weighted sampling
/// and the most likely candidate.
pub mod distribution;

/// Validated model configuration, deserializable with serde.
pub mod config;

/// Frequency table of every n-gram of a training sequence.
///
/// Supports sequential and parallel counting, and merging of partial tables.
/// This module is not exposed publicly.
mod frequency_table;

/// Token interning (token -> dense integer id).
mod vocabulary;
