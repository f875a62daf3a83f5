//! Animation sequences, frames, branches and mouth overlays.
//!
//! An animation block holds its own name, a transition type, an optional
//! return-animation name and a frame list. Frames layer images bottom-up,
//! optionally play a sound, and carry the branching table the player consults
//! on every tick.
//!
//! Frames hold image and sound ids rather than the assets themselves; image
//! ids are resolved against the image map while loading so a dangling
//! reference fails the whole load, while a dangling sound id is tolerated and
//! the frame simply stays silent.

use std::collections::BTreeMap;

use log::warn;

use super::image::Image;
use super::reader::Reader;
use super::sound::Sound;
use super::NO_SOUND;
use crate::file::AcsError;

/// What happens when an animation is interrupted by a new request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionType {
	/// Play the named return animation to get back to a neutral pose
	ReturnAnimation = 0x00,
	/// Walk the current animation's exit branches in reverse
	ExitBranches = 0x01,
	/// Cut straight to the next animation
	#[default]
	None = 0x02,
}

impl TransitionType {
	fn from_raw(raw: u8) -> Self {
		match raw {
			0x00 => Self::ReturnAnimation,
			0x01 => Self::ExitBranches,
			0x02 => Self::None,
			_ => {
				warn!("unknown transition type {raw}, treating as none");
				Self::None
			}
		}
	}
}

/// One image layer within a frame, positioned relative to the frame origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameImage {
	/// Id of the referenced image
	pub image_id: u32,
	/// Horizontal offset in pixels
	pub x: i16,
	/// Vertical offset in pixels
	pub y: i16,
}

/// A probabilistic jump target evaluated when a frame's time elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
	/// Zero-based index of the frame to jump to
	pub frame_id: u16,
	/// Chance of taking this branch, in percent
	pub probability: u16,
}

/// A lip-sync overlay describing one of seven mouth shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouthOverlay {
	/// Mouth shape selector (0 closed through 6 narrow)
	pub overlay_type: u8,
	/// Whether the overlay replaces the topmost frame image
	pub replace_top: bool,
	/// Id of the overlay image
	pub image_id: u16,
	/// Unidentified byte
	pub unknown: u8,
	/// Horizontal offset in pixels
	pub x: i16,
	/// Vertical offset in pixels
	pub y: i16,
	/// Overlay width in pixels
	pub width: u16,
	/// Overlay height in pixels
	pub height: u16,
}

impl MouthOverlay {
	fn read(r: &mut Reader<'_>) -> Result<Self, AcsError> {
		let overlay_type = r.read_u8()?;
		let replace_top = r.read_bool()?;
		let image_id = r.read_u16()?;
		let unknown = r.read_u8()?;
		let has_region = r.read_bool()?;
		let x = r.read_i16()?;
		let y = r.read_i16()?;
		let width = r.read_u16()?;
		let height = r.read_u16()?;

		// Region clip data is size-prefixed, so it can be skipped in place
		// without understanding its contents.
		if has_region {
			let size = r.read_u32()? as usize;
			r.skip(size)?;
		}

		Ok(Self {
			overlay_type,
			replace_top,
			image_id,
			unknown,
			x,
			y,
			width,
			height,
		})
	}
}

/// One frame of an animation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	images: Vec<FrameImage>,
	audio_index: u16,
	duration: u16,
	exit_frame: i16,
	branches: Vec<Branch>,
	mouth_overlays: Vec<MouthOverlay>,
}

impl Frame {
	fn read(
		r: &mut Reader<'_>,
		animation: &str,
		index: usize,
		images: &BTreeMap<u32, Image>,
		sounds: &BTreeMap<u16, Sound>,
	) -> Result<Self, AcsError> {
		let image_count = r.read_u16()?;
		// Reservation capped at what the stream can still hold (8 bytes per
		// entry); the loop count stays authoritative.
		let mut frame_images = Vec::with_capacity(usize::from(image_count).min(r.remaining() / 8));
		for _ in 0..image_count {
			let image_id = r.read_u32()?;
			let x = r.read_i16()?;
			let y = r.read_i16()?;
			if !images.contains_key(&image_id) {
				return Err(AcsError::UnresolvedReference {
					animation: animation.to_owned(),
					frame: index,
					id: image_id,
				});
			}
			frame_images.push(FrameImage {
				image_id,
				x,
				y,
			});
		}

		let audio_index = r.read_u16()?;
		let duration = r.read_u16()?;
		let exit_frame = r.read_i16()?;

		// A sound id with no matching sound is not an error; the frame plays
		// nothing, as in files that strip their audio.
		if audio_index != NO_SOUND && !sounds.contains_key(&audio_index) {
			warn!("animation {animation:?} frame {index} references missing sound {audio_index}");
		}

		let branch_count = r.read_u8()?;
		let mut branches = Vec::with_capacity(usize::from(branch_count));
		for _ in 0..branch_count {
			branches.push(Branch {
				frame_id: r.read_u16()?,
				probability: r.read_u16()?,
			});
		}

		let overlay_count = r.read_u8()?;
		let mut mouth_overlays = Vec::with_capacity(usize::from(overlay_count));
		for _ in 0..overlay_count {
			mouth_overlays.push(MouthOverlay::read(r)?);
		}

		Ok(Self {
			images: frame_images,
			audio_index,
			duration,
			exit_frame,
			branches,
			mouth_overlays,
		})
	}

	/// Returns the image layers in bottom-up compositing order.
	pub fn images(&self) -> &[FrameImage] {
		&self.images
	}

	/// Returns the sound id to play, or [`NO_SOUND`].
	pub fn audio_index(&self) -> u16 {
		self.audio_index
	}

	/// Returns the display duration in 10 ms ticks.
	pub fn duration(&self) -> u16 {
		self.duration
	}

	/// Returns the frame to jump to on a graceful stop, or -1 for none.
	pub fn exit_frame(&self) -> i16 {
		self.exit_frame
	}

	/// Returns the branching table evaluated when this frame's time elapses.
	pub fn branches(&self) -> &[Branch] {
		&self.branches
	}

	/// Returns the lip-sync overlays for this frame.
	pub fn mouth_overlays(&self) -> &[MouthOverlay] {
		&self.mouth_overlays
	}
}

/// A named animation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
	name: String,
	transition: TransitionType,
	return_animation: String,
	frames: Vec<Frame>,
}

impl Animation {
	/// Reads an animation block at the reader's current position.
	///
	/// The asset maps are consulted to resolve frame references; a missing
	/// image id fails the read.
	pub(crate) fn read(
		r: &mut Reader<'_>,
		images: &BTreeMap<u32, Image>,
		sounds: &BTreeMap<u16, Sound>,
	) -> Result<Self, AcsError> {
		let name = r.read_string()?;
		let transition = TransitionType::from_raw(r.read_u8()?);
		let return_animation = r.read_string()?;

		let frame_count = r.read_u16()?;
		let mut frames = Vec::with_capacity(usize::from(frame_count));
		for index in 0..usize::from(frame_count) {
			frames.push(Frame::read(r, &name, index, images, sounds)?);
		}

		Ok(Self {
			name,
			transition,
			return_animation,
			frames,
		})
	}

	/// Returns the animation's stored name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns how the animation behaves when interrupted.
	pub fn transition(&self) -> TransitionType {
		self.transition
	}

	/// Returns the name of the return animation, empty when there is none.
	pub fn return_animation(&self) -> &str {
		&self.return_animation
	}

	/// Returns the frame sequence.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}
}
