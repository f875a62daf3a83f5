//! The collaborator trait the player drives, and the view types it passes out.
//!
//! The player owns no clock, no surface and no audio device. Everything that
//! touches the outside world goes through [`PlayerHost`]: the host draws,
//! plays sounds, observes completions and schedules the wakeup that advances
//! the animation.

use std::time::Duration;

use agent_types::prelude::Rgb;

/// An opaque handle for one scheduled wakeup.
///
/// Every scheduled wakeup carries a fresh token; the player ignores tokens
/// from wakeups it no longer expects, so a host never has to cancel anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
	pub(crate) epoch: u64,
}

/// One image layer of a rendered frame, in bottom-up compositing order.
#[derive(Debug, Clone, Copy)]
pub struct FrameImageView<'a> {
	/// Palette-indexed pixel rows, bottom-up, stride-padded
	pub data: &'a [u8],
	/// Image width in pixels
	pub width: u16,
	/// Image height in pixels
	pub height: u16,
	/// Padded byte width of each pixel row
	pub row_stride: usize,
	/// Horizontal offset relative to the frame origin
	pub x: i16,
	/// Vertical offset relative to the frame origin
	pub y: i16,
}

/// Everything a host needs to composite one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
	/// Name of the animation the frame belongs to
	pub animation: &'a str,
	/// Zero-based frame index within the animation
	pub frame_index: usize,
	/// Image layers in bottom-up compositing order
	pub images: Vec<FrameImageView<'a>>,
	/// The character palette the pixel indices refer to
	pub palette: &'a [Rgb],
	/// Palette index to treat as transparent
	pub transparent_index: u8,
}

/// Rendering, audio, completion and scheduling collaborators for a player.
pub trait PlayerHost {
	/// Composites and presents one frame.
	fn render_frame(&mut self, frame: FrameView<'_>);

	/// Plays a sound effect, given the verbatim RIFF container bytes.
	fn play_sound(&mut self, data: &[u8]);

	/// Called once each time an animation finishes.
	fn animation_completed(&mut self);

	/// Asks the host to call [`Player::tick`] with `token` after `delay`.
	///
	/// [`Player::tick`]: crate::Player::tick
	fn schedule(&mut self, delay: Duration, token: TickToken);
}
