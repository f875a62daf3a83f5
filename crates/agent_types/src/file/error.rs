//! Error types for agent character file parsing.

use thiserror::Error;

/// Errors that can occur when parsing an agent character file
#[derive(Debug, Error)]
pub enum AcsError {
	/// A read ran past the end of the available bytes
	#[error(
		"Truncated stream at offset {offset}: needed {needed} bytes, only {available} available"
	)]
	TruncatedStream {
		/// Stream offset at which the read started
		offset: usize,
		/// Number of bytes the read required
		needed: usize,
		/// Number of bytes remaining in the stream
		available: usize,
	},

	/// The leading magic bytes match no known layout
	#[error("Invalid file signature: {0:02X?}")]
	InvalidSignature([u8; 4]),

	/// The magic bytes match a recognized but unimplemented legacy layout
	#[error("Unsupported legacy format: {0}")]
	UnsupportedFormat(&'static str),

	/// An animation frame references an image id that does not exist
	#[error("Animation {animation:?} frame {frame} references missing image {id}")]
	UnresolvedReference {
		/// Name of the animation whose frame holds the reference
		animation: String,
		/// Frame index within the animation
		frame: usize,
		/// The unresolvable image id
		id: u32,
	},

	/// Structurally readable but semantically inconsistent data
	#[error("Invalid character data: {0}")]
	InvalidData(String),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
