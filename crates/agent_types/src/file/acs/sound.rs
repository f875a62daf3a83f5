//! Sound effects stored as embedded RIFF wave containers.

use std::io::{Cursor, Write};

use super::reader::Reader;
use crate::file::AcsError;

/// A sound effect, held as the verbatim RIFF container bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
	data: Vec<u8>,
}

impl Sound {
	/// Reads `size` container bytes at the reader's current position.
	pub(crate) fn read(r: &mut Reader<'_>, size: usize) -> Result<Self, AcsError> {
		Ok(Self {
			data: r.read_bytes(size)?.to_vec(),
		})
	}

	/// Returns the raw RIFF container bytes.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Writes the container verbatim; the result is a playable `.wav` file.
	pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<(), AcsError> {
		sink.write_all(&self.data)?;
		Ok(())
	}

	/// Parses the container header and returns the PCM format.
	pub fn wav_spec(&self) -> Result<hound::WavSpec, AcsError> {
		let reader = hound::WavReader::new(Cursor::new(&self.data))
			.map_err(|e| AcsError::InvalidData(format!("bad RIFF container: {e}")))?;
		Ok(reader.spec())
	}
}
