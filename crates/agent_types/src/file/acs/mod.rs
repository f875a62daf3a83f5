//! `.ACS` file format support for the `agent-rs` project.
//!
//! This module provides support for loading Agent 2.x character files: desktop
//! assistant characters consisting of metadata, a color palette, palette-indexed
//! images, RIFF sound containers and branching animation sequences. The layout
//! was recovered by reverse engineering; all multi-byte integers are
//! little-endian.
//!
//! # File Structure Overview
//!
//! ```text
//! Offset  Size  Field            Description
//! ------  ----  ---------------  ------------------------------------------
//! 0x00    4     magic            0xABCDABC3 for the supported 2.x layout
//! 0x04    8     character_info   Locator (offset + size) of the metadata block
//! 0x0C    8     animation_info   Locator of the animation list
//! 0x14    8     image_info       Locator of the image list
//! 0x1C    8     audio_info       Locator of the audio list
//! ```
//!
//! Two sibling signatures are recognized and rejected as unsupported: the
//! 16-bit "Utopia" magic (`0x504C` at offset 0) from the 16-bit era, and the
//! structured-storage magic (`0xE011CFD0`) used by pre-2.0 character files.
//!
//! ## Strings
//!
//! Strings are stored as a u32 count of UTF-16 code units followed by
//! `count + 1` little-endian units (the terminator is included in the stored
//! data but not the count). Only the low byte of each unit is kept, so
//! non-Latin-1 characters are lost; this matches the behavior of the original
//! reader and is deliberate.
//!
//! ## Sections
//!
//! The four sections are read in a fixed order: metadata, images, audio,
//! animations. Animation frames reference images and sounds by id and resolve
//! those references while loading, which is why the asset lists come first.
//! A short read anywhere is fatal to the whole load; no partially populated
//! character is ever returned.
//!
//! # Usage Examples
//!
//! ## Loading a character
//!
//! ```no_run
//! use agent_types::file::acs::Character;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let character = Character::open("genie.acs")?;
//!
//! println!("{}: {}", character.name(), character.description());
//! for name in character.animation_names() {
//!     println!("  animation {name}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Exporting assets
//!
//! ```no_run
//! use agent_types::file::acs::Character;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let character = Character::open("genie.acs")?;
//!
//! for (id, image) in character.images() {
//!     let mut out = std::fs::File::create(format!("image_{id}.bmp"))?;
//!     image.write_bmp(&mut out, character.palette())?;
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod animation;
pub mod character;
pub mod decode;
pub mod image;
pub mod reader;
pub mod sound;


use crate::file::AcsError;

pub(crate) mod constants {
	/// Magic for the supported Agent 2.x layout
	pub const AGENT_V2_MAGIC: u32 = 0xABCD_ABC3;

	/// 16-bit magic of the unimplemented "Utopia" era layout
	pub const UTOPIA_LE_MAGIC: u16 = 0x504C;

	/// Magic of the pre-2.0 structured-storage layout (unimplemented)
	pub const STRUCTURED_STORAGE_MAGIC: u32 = 0xE011_CFD0;
}

/// Sentinel audio index meaning "this frame plays no sound"
pub const NO_SOUND: u16 = 65535;

/// Milliseconds per animation tick; a frame's real duration is `duration * TICK_MS`
pub const TICK_MS: u64 = 10;

/// An (offset, size) pair pointing into the source byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
	/// Absolute byte offset from the start of the stream
	pub offset: u32,
	/// Size of the referenced block in bytes
	pub size: u32,
}

impl Locator {
	/// Reads a locator (two u32 values) at the reader's current position.
	pub(crate) fn read(r: &mut reader::Reader<'_>) -> Result<Self, AcsError> {
		let offset = r.read_u32()?;
		let size = r.read_u32()?;
		Ok(Self {
			offset,
			size,
		})
	}
}

// Re-exports for convenience
pub use self::animation::{Animation, Branch, Frame, FrameImage, MouthOverlay, TransitionType};
pub use self::character::{BalloonInfo, Character, Guid, Rgb, VoiceExtraInfo, VoiceInfo};
pub use self::decode::decode;
pub use self::image::Image;
pub use self::reader::Reader;
pub use self::sound::Sound;
