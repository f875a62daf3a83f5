//! Sequential byte cursor over a character file.
//!
//! All reads are little-endian and bounds-checked; running past the end of the
//! buffer yields [`AcsError::TruncatedStream`], which callers treat as fatal
//! for the section being loaded.

use crate::file::AcsError;

/// A bounds-checked cursor over an in-memory byte buffer.
#[derive(Debug)]
pub struct Reader<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	/// Creates a new reader positioned at the start of `data`.
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			pos: 0,
		}
	}

	/// Returns the current absolute position.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Returns the number of bytes remaining after the current position.
	pub fn remaining(&self) -> usize {
		self.data.len().saturating_sub(self.pos)
	}

	/// Moves the cursor to an absolute offset.
	///
	/// Seeking past the end of the buffer fails like any other read would.
	pub fn seek(&mut self, offset: usize) -> Result<(), AcsError> {
		if offset > self.data.len() {
			return Err(AcsError::TruncatedStream {
				offset,
				needed: 0,
				available: 0,
			});
		}
		self.pos = offset;
		Ok(())
	}

	/// Reads `count` raw bytes and advances the cursor.
	pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], AcsError> {
		if self.remaining() < count {
			return Err(AcsError::TruncatedStream {
				offset: self.pos,
				needed: count,
				available: self.remaining(),
			});
		}
		let slice = &self.data[self.pos..self.pos + count];
		self.pos += count;
		Ok(slice)
	}

	/// Reads a single byte.
	pub fn read_u8(&mut self) -> Result<u8, AcsError> {
		let bytes = self.read_bytes(1)?;
		Ok(bytes[0])
	}

	/// Reads a little-endian u16.
	pub fn read_u16(&mut self) -> Result<u16, AcsError> {
		let bytes = self.read_bytes(2)?;
		Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
	}

	/// Reads a little-endian u32.
	pub fn read_u32(&mut self) -> Result<u32, AcsError> {
		let bytes = self.read_bytes(4)?;
		Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	/// Reads a little-endian i16.
	pub fn read_i16(&mut self) -> Result<i16, AcsError> {
		let bytes = self.read_bytes(2)?;
		Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
	}

	/// Reads a little-endian i32.
	pub fn read_i32(&mut self) -> Result<i32, AcsError> {
		let bytes = self.read_bytes(4)?;
		Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	/// Reads a single byte as a boolean flag (non-zero = true).
	pub fn read_bool(&mut self) -> Result<bool, AcsError> {
		Ok(self.read_u8()? != 0)
	}

	/// Reads a length-prefixed string.
	///
	/// The layout is a u32 count of UTF-16 code units followed by `count + 1`
	/// little-endian units (terminator included). Only the low byte of each
	/// unit is kept and decoding stops at the first zero unit; non-Latin-1
	/// characters are deliberately lost, matching the original reader.
	pub fn read_string(&mut self) -> Result<String, AcsError> {
		let length = self.read_u32()? as usize;
		if length == 0 {
			return Ok(String::new());
		}

		let bytes = self.read_bytes((length + 1) * 2)?;
		let mut result = String::with_capacity(length);
		for unit in bytes.chunks_exact(2) {
			let wc = u16::from_le_bytes([unit[0], unit[1]]);
			if wc == 0 {
				break;
			}
			result.push(char::from((wc & 0xFF) as u8));
		}

		Ok(result)
	}

	/// Reads and discards a length-prefixed string.
	pub fn skip_string(&mut self) -> Result<(), AcsError> {
		let length = self.read_u32()? as usize;
		if length == 0 {
			return Ok(());
		}
		self.read_bytes((length + 1) * 2)?;
		Ok(())
	}

	/// Advances the cursor by `count` bytes without interpreting them.
	pub fn skip(&mut self, count: usize) -> Result<(), AcsError> {
		self.read_bytes(count)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_read_integers() {
		let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF];
		let mut r = Reader::new(&data);
		assert_eq!(r.read_u8().unwrap(), 0x01);
		assert_eq!(r.read_u16().unwrap(), 0x0302);
		assert_eq!(r.read_u8().unwrap(), 0x04);
		assert_eq!(r.read_i16().unwrap(), -1);
		assert_eq!(r.remaining(), 0);
	}

	#[test]
	fn test_read_past_end() {
		let data = [0x01, 0x02];
		let mut r = Reader::new(&data);
		let err = r.read_u32().unwrap_err();
		assert!(matches!(err, AcsError::TruncatedStream { needed: 4, available: 2, .. }));
	}

	#[test]
	fn test_seek() {
		let data = [0x00, 0x00, 0x00, 0x2A];
		let mut r = Reader::new(&data);
		r.seek(3).unwrap();
		assert_eq!(r.read_u8().unwrap(), 0x2A);
		assert!(r.seek(5).is_err());
	}

	#[test]
	fn test_read_string_latin1_truncation() {
		// "Hi" with a non-Latin-1 unit (0x0142) whose low byte is kept
		let mut data = vec![3, 0, 0, 0];
		for unit in [0x0048u16, 0x0069, 0x0142, 0x0000] {
			data.extend_from_slice(&unit.to_le_bytes());
		}
		let mut r = Reader::new(&data);
		assert_eq!(r.read_string().unwrap(), "HiB");
	}

	#[test]
	fn test_read_string_stops_at_terminator() {
		// Length claims 4 units but a zero unit appears after 2
		let mut data = vec![4, 0, 0, 0];
		for unit in [0x0041u16, 0x0042, 0x0000, 0x0043, 0x0000] {
			data.extend_from_slice(&unit.to_le_bytes());
		}
		let mut r = Reader::new(&data);
		assert_eq!(r.read_string().unwrap(), "AB");
		// All (length + 1) units were consumed regardless
		assert_eq!(r.remaining(), 0);
	}

	#[test]
	fn test_read_empty_string() {
		let data = [0, 0, 0, 0];
		let mut r = Reader::new(&data);
		assert_eq!(r.read_string().unwrap(), "");
		assert_eq!(r.remaining(), 0);
	}

	#[test]
	fn test_read_string_truncated() {
		let data = [5, 0, 0, 0, 0x41, 0x00];
		let mut r = Reader::new(&data);
		assert!(r.read_string().is_err());
	}
}
