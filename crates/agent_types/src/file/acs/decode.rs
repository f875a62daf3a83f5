//! LZ77-style decompressor for character file payloads.
//!
//! Images and region data inside a character file are stored with a bit-packed
//! sliding-window scheme. The stream is consumed as a sequence of tokens read
//! from a 32-bit little-endian window that slides over the source a byte at a
//! time:
//!
//! ```text
//! Token        Bits                         Meaning
//! -----------  ---------------------------  -------------------------------
//! 0            8 literal bits               one output byte, as-is
//! 1 0          6 distance bits              match, distance 1..=64
//! 1 1 0        9 distance bits              match, distance 65..=576
//! 1 1 1 0      12 distance bits             match, distance 577..=4672
//! 1 1 1 1     20 distance bits             match, distance 4673.., or end
//! ```
//!
//! The 20-bit distance value `0xFFFFF` is the end-of-stream sentinel. Match
//! lengths follow the distance as a unary run of 1-bits (up to 12) selecting a
//! width, then that many value bits.
//!
//! A valid stream starts with a zero byte and ends with at least six `0xFF`
//! bytes; anything else decodes to nothing.

/// Decompresses `src` into `dst` starting at `dst_offset`.
///
/// Returns the number of bytes written, or 0 when the source fails the framing
/// checks (leading zero byte, trailing `0xFF` run). Decoding stops early
/// without error when the output buffer fills or a match reaches back past the
/// start of the output; callers compare the return value against the expected
/// size.
pub fn decode(src: &[u8], dst: &mut [u8], dst_offset: usize) -> usize {
	if src.len() <= 7 || src[0] != 0 {
		return 0;
	}

	// A conforming stream is padded with 0xFF; require at least six of them.
	let mut trailer = 0;
	for &byte in src.iter().rev().take(7) {
		if byte != 0xFF {
			break;
		}
		trailer += 1;
	}
	if trailer < 6 {
		return 0;
	}

	let mut pos = 5usize;
	let mut bitcount = 0usize;
	let mut out = dst_offset;

	loop {
		if pos > src.len() {
			break;
		}
		let mut quad = read_window(src, pos);

		if quad & (1 << bitcount) != 0 {
			// Match token: decode the distance class from up to three prefix bits.
			let (distance, bonus);
			if quad & (1 << (bitcount + 1)) == 0 {
				distance = ((quad >> (bitcount + 2)) & 0x3F) as usize + 1;
				bonus = 1;
				bitcount += 8;
			} else if quad & (1 << (bitcount + 2)) == 0 {
				distance = ((quad >> (bitcount + 3)) & 0x1FF) as usize + 65;
				bonus = 1;
				bitcount += 12;
			} else if quad & (1 << (bitcount + 3)) == 0 {
				distance = ((quad >> (bitcount + 4)) & 0xFFF) as usize + 577;
				bonus = 1;
				bitcount += 16;
			} else {
				let raw = (quad >> (bitcount + 4)) & 0xF_FFFF;
				if raw == 0xF_FFFF {
					break;
				}
				distance = raw as usize + 4673;
				bonus = 2;
				bitcount += 24;
			}

			pos += bitcount / 8;
			bitcount &= 7;
			if pos > src.len() {
				break;
			}
			quad = read_window(src, pos);

			// Match length: unary run of 1-bits selects the value width.
			let mut run_count = 0usize;
			while quad & (1 << (bitcount + run_count)) != 0 {
				run_count += 1;
				if run_count > 11 {
					break;
				}
			}

			let run_len = ((quad >> (bitcount + run_count + 1)) as usize & ((1 << run_count) - 1))
				+ (1 << run_count)
				+ bonus;
			bitcount += run_count * 2 + 1;

			if out + run_len > dst.len() {
				break;
			}
			if distance > out {
				break;
			}
			// Overlapping copies are valid; go byte by byte.
			for _ in 0..run_len {
				dst[out] = dst[out - distance];
				out += 1;
			}
		} else {
			// Literal token: eight bits of output byte.
			if out >= dst.len() {
				break;
			}
			dst[out] = ((quad >> (bitcount + 1)) & 0xFF) as u8;
			out += 1;
			bitcount += 9;
		}

		pos += bitcount / 8;
		bitcount &= 7;
	}

	out - dst_offset
}

/// Reads the 32-bit little-endian window ending at `pos`.
///
/// The window covers `src[pos - 4..pos]`; positions past the end of the source
/// read zero for the missing high bytes.
fn read_window(src: &[u8], pos: usize) -> u32 {
	let mut quad = 0u32;
	for i in 0..4 {
		let idx = pos - 4 + i;
		if idx < src.len() {
			quad |= u32::from(src[idx]) << (i * 8);
		}
	}
	quad
}
