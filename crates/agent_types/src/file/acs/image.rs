//! Palette-indexed character images.
//!
//! Each image block stores one byte per pixel indexing the character palette,
//! with rows padded to a four byte boundary and stored bottom-up, matching the
//! Windows DIB convention. Compressed payloads run through the sliding-window
//! codec; the expected decoded size is `stride * height`.

use std::io::Write;

use log::warn;

use super::decode::decode;
use super::reader::Reader;
use crate::file::AcsError;

/// Returns the padded row stride for a given pixel width.
pub fn stride(width: u16) -> usize {
	(usize::from(width) + 3) & !3
}

/// A single palette-indexed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
	unknown: u8,
	width: u16,
	height: u16,
	compressed: bool,
	data: Vec<u8>,
}

impl Image {
	/// Reads an image block at the reader's current position.
	pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let unknown = r.read_u8()?;
		let width = r.read_u16()?;
		let height = r.read_u16()?;
		let compressed = r.read_bool()?;

		let payload_size = r.read_u32()? as usize;
		let data = if payload_size == 0 {
			Vec::new()
		} else if compressed {
			let payload = r.read_bytes(payload_size)?;
			let expected = stride(width) * usize::from(height);
			let mut data = vec![0u8; expected];
			let decoded = decode(payload, &mut data, 0);
			if decoded != expected {
				warn!("image decoded to {decoded} bytes, expected {expected}");
			}
			data
		} else {
			r.read_bytes(payload_size)?.to_vec()
		};

		// Region clip sizes trail the pixel data; the clip itself is unused.
		let _region_compressed_size = r.read_u32()?;
		let _region_uncompressed_size = r.read_u32()?;

		Ok(Self {
			unknown,
			width,
			height,
			compressed,
			data,
		})
	}

	/// Returns the image width in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Returns the image height in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Whether the stored payload was compressed.
	pub fn compressed(&self) -> bool {
		self.compressed
	}

	/// Returns the palette-indexed pixel rows, bottom-up, stride-padded.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Returns the padded byte width of each pixel row.
	pub fn row_stride(&self) -> usize {
		stride(self.width)
	}

	/// Writes the image as an 8-bit indexed Windows bitmap.
	///
	/// The character palette is embedded as BGRX quads and the pixel rows are
	/// written as stored, which is already the bottom-up DIB layout.
	pub fn write_bmp<W: Write>(&self, sink: &mut W, palette: &[super::Rgb]) -> Result<(), AcsError> {
		const FILE_HEADER_SIZE: u32 = 14;
		const INFO_HEADER_SIZE: u32 = 40;

		let palette_size = palette.len() as u32 * 4;
		let offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + palette_size;

		// BITMAPFILEHEADER
		sink.write_all(b"BM")?;
		sink.write_all(&(offset + self.data.len() as u32).to_le_bytes())?;
		sink.write_all(&0u16.to_le_bytes())?;
		sink.write_all(&0u16.to_le_bytes())?;
		sink.write_all(&offset.to_le_bytes())?;

		// BITMAPINFOHEADER
		sink.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
		sink.write_all(&i32::from(self.width).to_le_bytes())?;
		sink.write_all(&i32::from(self.height).to_le_bytes())?;
		sink.write_all(&1u16.to_le_bytes())?;
		sink.write_all(&8u16.to_le_bytes())?;
		sink.write_all(&0u32.to_le_bytes())?;
		sink.write_all(&((self.row_stride() * usize::from(self.height)) as u32).to_le_bytes())?;
		sink.write_all(&0i32.to_le_bytes())?;
		sink.write_all(&0i32.to_le_bytes())?;
		sink.write_all(&(palette.len() as u32).to_le_bytes())?;
		sink.write_all(&(palette.len() as u32).to_le_bytes())?;

		for color in palette {
			sink.write_all(&[color.b, color.g, color.r, 0])?;
		}

		sink.write_all(&self.data)?;
		Ok(())
	}
}
