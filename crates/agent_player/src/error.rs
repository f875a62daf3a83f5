//! Error types for animation playback.

use thiserror::Error;

/// Errors that can occur while driving playback.
#[derive(Debug, Error)]
pub enum PlayerError {
	/// A frame's branch probabilities add up to more than 100 percent
	#[error("Branch probabilities sum to {total}, expected at most 100")]
	InvalidProbabilityTable {
		/// Sum of the probability column
		total: u32,
	},
}
