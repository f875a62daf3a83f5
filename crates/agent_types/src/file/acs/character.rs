//! Top-level character type and the metadata section loader.
//!
//! `Character::from_bytes` dispatches on the leading magic, then loads the four
//! sections in dependency order: metadata, images, sounds, animations. Frames
//! reference images and sounds by id, so the asset maps must exist before the
//! animation list is walked. Loading is atomic; any failure discards the
//! partially built character.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use log::debug;
use serde::Serialize;

use super::animation::Animation;
use super::constants;
use super::image::Image;
use super::reader::Reader;
use super::sound::Sound;
use super::Locator;
use crate::file::AcsError;

/// Character style flag bits.
mod flags {
	pub const TTS: u32 = 0x0000_0020;
	pub const BALLOON: u32 = 0x0000_0200;
	pub const SIZE_TO_TEXT: u32 = 0x0001_0000;
	pub const NO_AUTO_HIDE: u32 = 0x0002_0000;
	pub const NO_AUTO_PACE: u32 = 0x0004_0000;
	pub const STANDARD_ANIMATION_SET: u32 = 0x0010_0000;
}

/// Locale id of the English (United States) localized-info entry
const LOCALE_EN_US: u16 = 9;

/// A 16-byte GUID stored in Windows mixed-endian layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Guid([u8; 16]);

impl Guid {
	/// Reads a GUID from the reader's current position.
	pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let bytes = r.read_bytes(16)?;
		let mut guid = [0u8; 16];
		guid.copy_from_slice(bytes);
		Ok(Self(guid))
	}

	/// Returns the raw 16 bytes in stored order.
	pub fn as_bytes(&self) -> &[u8; 16] {
		&self.0
	}
}

impl fmt::Display for Guid {
	/// Formats as `{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}` with lowercase hex.
	///
	/// The first three groups are little-endian in the stored bytes, the final
	/// eight bytes are verbatim.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let b = &self.0;
		let data1 = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
		let data2 = u16::from_le_bytes([b[4], b[5]]);
		let data3 = u16::from_le_bytes([b[6], b[7]]);
		write!(
			f,
			"{{{data1:08x}-{data2:04x}-{data3:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
			b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
		)
	}
}

impl Serialize for Guid {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// An RGB color decoded from a stored BGRX quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgb {
	/// Red component
	pub r: u8,
	/// Green component
	pub g: u8,
	/// Blue component
	pub b: u8,
}

impl Rgb {
	/// Reads a BGRX quad (blue, green, red, reserved) from the reader.
	pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let quad = r.read_bytes(4)?;
		Ok(Self {
			r: quad[2],
			g: quad[1],
			b: quad[0],
		})
	}
}

/// Text-to-speech voice settings, present when the TTS style flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
	/// GUID of the speech engine
	pub engine_id: Guid,
	/// GUID of the speech mode
	pub mode_id: Guid,
	/// Speaking speed
	pub speed: u32,
	/// Speaking pitch
	pub pitch: u16,
	/// Optional extended voice attributes
	pub extra: Option<VoiceExtraInfo>,
}

/// Extended voice attributes, present behind a flag byte inside the voice block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceExtraInfo {
	/// Windows language id
	pub lang_id: u16,
	/// Dialect name
	pub dialect: String,
	/// Voice gender code
	pub gender: u16,
	/// Voice age code
	pub age: u16,
	/// Voice style name
	pub style: String,
}

/// Word balloon presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalloonInfo {
	/// Number of text lines the balloon shows
	pub text_lines: u8,
	/// Characters per line before wrapping
	pub chars_per_line: u8,
	/// Text color
	pub foreground: Rgb,
	/// Balloon fill color
	pub background: Rgb,
	/// Balloon border color
	pub border: Rgb,
	/// Font face name
	pub font_name: String,
	/// Font height in logical units
	pub font_height: i32,
	/// Font weight
	pub font_weight: i32,
	/// Whether the font is italicized
	pub italic: bool,
	/// Unidentified trailing byte
	pub unknown: u8,
}

impl VoiceInfo {
	fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let engine_id = Guid::read(r)?;
		let mode_id = Guid::read(r)?;
		let speed = r.read_u32()?;
		let pitch = r.read_u16()?;
		let extra = if r.read_bool()? {
			Some(VoiceExtraInfo {
				lang_id: r.read_u16()?,
				dialect: r.read_string()?,
				gender: r.read_u16()?,
				age: r.read_u16()?,
				style: r.read_string()?,
			})
		} else {
			None
		};
		Ok(Self {
			engine_id,
			mode_id,
			speed,
			pitch,
			extra,
		})
	}
}

impl BalloonInfo {
	fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		Ok(Self {
			text_lines: r.read_u8()?,
			chars_per_line: r.read_u8()?,
			foreground: Rgb::read(r)?,
			background: Rgb::read(r)?,
			border: Rgb::read(r)?,
			font_name: r.read_string()?,
			font_height: r.read_i32()?,
			font_weight: r.read_i32()?,
			italic: r.read_bool()?,
			unknown: r.read_u8()?,
		})
	}
}

/// A fully loaded agent character.
///
/// Owns every asset the file contained: metadata, palette, images, sounds and
/// animations. Animation frames reference images and sounds by id, resolved
/// through the maps here rather than holding pointers into them.
#[derive(Debug)]
pub struct Character {
	name: String,
	description: String,
	extra_data: String,
	guid: Guid,
	width: u16,
	height: u16,
	transparent_index: u8,
	flags: u32,
	version: (u16, u16),
	animation_set_version: (u16, u16),
	voice: Option<VoiceInfo>,
	balloon: BalloonInfo,
	palette: Vec<Rgb>,
	states: BTreeMap<String, Vec<String>>,
	images: BTreeMap<u32, Image>,
	sounds: BTreeMap<u16, Sound>,
	animations: BTreeMap<String, Animation>,
}

impl Character {
	/// Loads a character from a file on disk.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AcsError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Loads a character from an in-memory byte buffer.
	pub fn from_bytes(data: &[u8]) -> Result<Self, AcsError> {
		// The 16-bit era signature is only two bytes long, so it has to be
		// checked before the four-byte magic is read.
		if data.len() >= 2 && u16::from_le_bytes([data[0], data[1]]) == constants::UTOPIA_LE_MAGIC {
			return Err(AcsError::UnsupportedFormat("16-bit Utopia character file"));
		}
		let mut r = Reader::new(data);
		let magic = r.read_u32()?;
		match magic {
			constants::AGENT_V2_MAGIC => Self::load_v2(&mut r),
			constants::STRUCTURED_STORAGE_MAGIC => Err(AcsError::UnsupportedFormat(
				"structured-storage character file (Agent 1.x)",
			)),
			_ => Err(AcsError::InvalidSignature(magic.to_le_bytes())),
		}
	}

	/// Loads the Agent 2.x layout, with the reader positioned after the magic.
	fn load_v2(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let character_info = Locator::read(r)?;
		let animation_info = Locator::read(r)?;
		let image_info = Locator::read(r)?;
		let audio_info = Locator::read(r)?;

		let mut character = Self::load_metadata(r, character_info)?;
		character.images = Self::load_images(r, image_info)?;
		character.sounds = Self::load_sounds(r, audio_info)?;
		character.animations =
			Self::load_animations(r, animation_info, &character.images, &character.sounds)?;

		debug!(
			"loaded character {:?}: {} images, {} sounds, {} animations",
			character.name,
			character.images.len(),
			character.sounds.len(),
			character.animations.len()
		);

		Ok(character)
	}

	fn load_metadata(r: &mut Reader<'_>, locator: Locator) -> Result<Self, AcsError> {
		r.seek(locator.offset as usize)?;

		let minor = r.read_u16()?;
		let major = r.read_u16()?;
		let localized_info = Locator::read(r)?;
		let guid = Guid::read(r)?;
		let width = r.read_u16()?;
		let height = r.read_u16()?;
		let transparent_index = r.read_u8()?;
		let flags = r.read_u32()?;
		let animation_set_major = r.read_u16()?;
		let animation_set_minor = r.read_u16()?;

		// Voice settings only exist when the TTS style bit is set; characters
		// shipped without speech support omit the whole block.
		let voice = if flags & flags::TTS != 0 {
			Some(VoiceInfo::read(r)?)
		} else {
			None
		};

		let balloon = BalloonInfo::read(r)?;

		let palette_count = r.read_u32()? as usize;
		// Cap the reservation at what the stream can still hold (4 bytes per
		// entry); the loop count stays authoritative.
		let mut palette = Vec::with_capacity(palette_count.min(r.remaining() / 4));
		for _ in 0..palette_count {
			palette.push(Rgb::read(r)?);
		}

		if usize::from(transparent_index) >= palette.len() {
			return Err(AcsError::InvalidData(format!(
				"transparent color index {transparent_index} outside palette of {} entries",
				palette.len()
			)));
		}

		// Tray icon payloads are skipped in place; nothing downstream uses them.
		if r.read_bool()? {
			let mono_size = r.read_u32()? as usize;
			r.skip(mono_size)?;
			let color_size = r.read_u32()? as usize;
			r.skip(color_size)?;
		}

		let state_count = r.read_u16()?;
		let mut states = BTreeMap::new();
		for _ in 0..state_count {
			let state_name = r.read_string()?;
			let animation_count = r.read_u16()?;
			let mut names = Vec::with_capacity(usize::from(animation_count));
			for _ in 0..animation_count {
				names.push(r.read_string()?);
			}
			states.insert(state_name, names);
		}

		// Localized names live behind a secondary locator; only the en-US
		// entry is kept.
		let mut name = String::new();
		let mut description = String::new();
		let mut extra_data = String::new();
		r.seek(localized_info.offset as usize)?;
		let localization_count = r.read_u16()?;
		for _ in 0..localization_count {
			let locale = r.read_u16()?;
			if locale == LOCALE_EN_US {
				name = r.read_string()?;
				description = r.read_string()?;
				extra_data = r.read_string()?;
			} else {
				r.skip_string()?;
				r.skip_string()?;
				r.skip_string()?;
			}
		}

		Ok(Self {
			name,
			description,
			extra_data,
			guid,
			width,
			height,
			transparent_index,
			flags,
			version: (major, minor),
			animation_set_version: (animation_set_major, animation_set_minor),
			voice,
			balloon,
			palette,
			states,
			images: BTreeMap::new(),
			sounds: BTreeMap::new(),
			animations: BTreeMap::new(),
		})
	}

	fn load_images(r: &mut Reader<'_>, locator: Locator) -> Result<BTreeMap<u32, Image>, AcsError> {
		r.seek(locator.offset as usize)?;
		let count = r.read_u32()?;

		// The list is (locator, checksum) pairs; images are keyed by their
		// position in it. Checksums are carried but never verified. The
		// reservation is capped at what the stream can still hold (12 bytes
		// per entry).
		let mut locators = Vec::with_capacity((count as usize).min(r.remaining() / 12));
		for id in 0..count {
			let image_locator = Locator::read(r)?;
			let _checksum = r.read_u32()?;
			locators.push((id, image_locator));
		}

		let mut images = BTreeMap::new();
		for (id, image_locator) in locators {
			r.seek(image_locator.offset as usize)?;
			images.insert(id, Image::read(r)?);
		}

		debug!("loaded {} images", images.len());
		Ok(images)
	}

	fn load_sounds(r: &mut Reader<'_>, locator: Locator) -> Result<BTreeMap<u16, Sound>, AcsError> {
		r.seek(locator.offset as usize)?;
		let count = r.read_u32()?;

		let mut locators = Vec::with_capacity((count as usize).min(r.remaining() / 12));
		for id in 0..count {
			let sound_locator = Locator::read(r)?;
			let _checksum = r.read_u32()?;
			locators.push((id as u16, sound_locator));
		}

		let mut sounds = BTreeMap::new();
		for (id, sound_locator) in locators {
			r.seek(sound_locator.offset as usize)?;
			sounds.insert(id, Sound::read(r, sound_locator.size as usize)?);
		}

		debug!("loaded {} sounds", sounds.len());
		Ok(sounds)
	}

	fn load_animations(
		r: &mut Reader<'_>,
		locator: Locator,
		images: &BTreeMap<u32, Image>,
		sounds: &BTreeMap<u16, Sound>,
	) -> Result<BTreeMap<String, Animation>, AcsError> {
		r.seek(locator.offset as usize)?;
		let count = r.read_u32()?;

		// Collect the name list first, then materialize each animation at its
		// locator. The BTreeMap fixes lexical name order regardless of the
		// order the list stores them in.
		let mut locators = BTreeMap::new();
		for _ in 0..count {
			let name = r.read_string()?;
			locators.insert(name, Locator::read(r)?);
		}

		let mut animations = BTreeMap::new();
		for (name, animation_locator) in locators {
			r.seek(animation_locator.offset as usize)?;
			let animation = Animation::read(r, images, sounds)?;
			animations.insert(name, animation);
		}

		debug!("loaded {} animations", animations.len());
		Ok(animations)
	}

	/// Returns the character's localized display name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the character's localized description.
	pub fn description(&self) -> &str {
		&self.description
	}

	/// Returns the localized extra data string, typically empty.
	pub fn extra_data(&self) -> &str {
		&self.extra_data
	}

	/// Returns the character's unique id.
	pub fn guid(&self) -> Guid {
		self.guid
	}

	/// Returns the nominal frame width in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Returns the nominal frame height in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Returns the (major, minor) file format version.
	pub fn version(&self) -> (u16, u16) {
		self.version
	}

	/// Returns the (major, minor) animation set version.
	pub fn animation_set_version(&self) -> (u16, u16) {
		self.animation_set_version
	}

	/// Returns the raw style flags word.
	pub fn flags(&self) -> u32 {
		self.flags
	}

	/// Whether the character carries text-to-speech voice settings.
	pub fn tts_enabled(&self) -> bool {
		self.flags & flags::TTS != 0
	}

	/// Whether the character uses a word balloon.
	pub fn balloon_enabled(&self) -> bool {
		self.flags & flags::BALLOON != 0
	}

	/// Whether the balloon sizes itself to its text.
	pub fn balloon_size_to_text(&self) -> bool {
		self.flags & flags::SIZE_TO_TEXT != 0
	}

	/// Whether the balloon stays up instead of auto-hiding.
	pub fn balloon_no_auto_hide(&self) -> bool {
		self.flags & flags::NO_AUTO_HIDE != 0
	}

	/// Whether balloon text appears all at once instead of paced.
	pub fn balloon_no_auto_pace(&self) -> bool {
		self.flags & flags::NO_AUTO_PACE != 0
	}

	/// Whether the character provides the standard animation set.
	pub fn standard_animation_set(&self) -> bool {
		self.flags & flags::STANDARD_ANIMATION_SET != 0
	}

	/// Returns the voice settings, if the character has any.
	pub fn voice(&self) -> Option<&VoiceInfo> {
		self.voice.as_ref()
	}

	/// Returns the word balloon settings.
	pub fn balloon(&self) -> &BalloonInfo {
		&self.balloon
	}

	/// Returns the color palette shared by all images.
	pub fn palette(&self) -> &[Rgb] {
		&self.palette
	}

	/// Returns the palette index rendered as transparent.
	pub fn transparent_index(&self) -> u8 {
		self.transparent_index
	}

	/// Returns the palette entry at the transparent index.
	pub fn transparent_color(&self) -> Rgb {
		// Index validity is enforced at load time.
		self.palette[usize::from(self.transparent_index)]
	}

	/// Returns the named states and the animation names each maps to.
	pub fn states(&self) -> &BTreeMap<String, Vec<String>> {
		&self.states
	}

	/// Returns the animation names a state maps to, if the state exists.
	pub fn state(&self, name: &str) -> Option<&[String]> {
		self.states.get(name).map(Vec::as_slice)
	}

	/// Whether the character defines the named state.
	pub fn has_state(&self, name: &str) -> bool {
		self.states.contains_key(name)
	}

	/// Returns all images keyed by id.
	pub fn images(&self) -> &BTreeMap<u32, Image> {
		&self.images
	}

	/// Looks up an image by id.
	pub fn image(&self, id: u32) -> Option<&Image> {
		self.images.get(&id)
	}

	/// Returns all sounds keyed by id.
	pub fn sounds(&self) -> &BTreeMap<u16, Sound> {
		&self.sounds
	}

	/// Looks up a sound by id.
	pub fn sound(&self, id: u16) -> Option<&Sound> {
		self.sounds.get(&id)
	}

	/// Returns all animations keyed by name, in lexical order.
	pub fn animations(&self) -> &BTreeMap<String, Animation> {
		&self.animations
	}

	/// Looks up an animation by name.
	pub fn animation(&self, name: &str) -> Option<&Animation> {
		self.animations.get(name)
	}

	/// Whether the character defines the named animation.
	pub fn has_animation(&self, name: &str) -> bool {
		self.animations.contains_key(name)
	}

	/// Returns the animation names in lexical order.
	pub fn animation_names(&self) -> impl Iterator<Item = &str> {
		self.animations.keys().map(String::as_str)
	}
}
