//! The tick-driven animation player.
//!
//! `Player` holds cursor state only: which animation is current, which frame
//! it is on, and what is queued behind it. It owns no clock; after rendering a
//! frame it asks the host to schedule a wakeup, and the host calls [`tick`]
//! back with the token it was given. A token from a wakeup the player has
//! moved past is ignored, so interrupting an animation never races its
//! pending timer.
//!
//! [`tick`]: Player::tick

use std::collections::VecDeque;
use std::time::Duration;

use agent_types::prelude::{Character, Frame, TransitionType, NO_SOUND, TICK_MS};
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::branch::choose_branch;
use crate::error::PlayerError;
use crate::host::{FrameImageView, FrameView, PlayerHost, TickToken};

/// Playback cursor over a character's animations.
#[derive(Debug)]
pub struct Player {
	current: Option<String>,
	frame: usize,
	animating: bool,
	stop_requested: bool,
	queue: VecDeque<String>,
	deferred: Option<String>,
	epoch: u64,
	rng: SmallRng,
}

impl Player {
	/// Creates a player with operating-system randomness for branch rolls.
	pub fn new() -> Self {
		Self::with_rng(SmallRng::from_os_rng())
	}

	/// Creates a player with a fixed seed, for reproducible branch rolls.
	pub fn from_seed(seed: u64) -> Self {
		Self::with_rng(SmallRng::seed_from_u64(seed))
	}

	fn with_rng(rng: SmallRng) -> Self {
		Self {
			current: None,
			frame: 0,
			animating: false,
			stop_requested: false,
			queue: VecDeque::new(),
			deferred: None,
			epoch: 0,
			rng,
		}
	}

	/// Whether an animation is actively being stepped.
	pub fn is_animating(&self) -> bool {
		self.animating
	}

	/// Returns the name of the current animation, if any.
	///
	/// This can be `Some` while [`is_animating`] is false: an animation that
	/// ended on an imageless exit pose stays current so a later request can
	/// reverse out of it.
	///
	/// [`is_animating`]: Player::is_animating
	pub fn current_animation(&self) -> Option<&str> {
		self.current.as_deref()
	}

	/// Requests an animation by name.
	///
	/// An unknown name is ignored. If an animation is already playing, it is
	/// asked to stop gracefully and the new name is queued behind it. If the
	/// previous animation ended on an exit-branch pose, it is first walked
	/// back out via its exit frames, and the new name plays after that.
	pub fn request<H: PlayerHost>(&mut self, character: &Character, host: &mut H, name: &str) {
		if !character.has_animation(name) {
			warn!("no such animation {name:?}");
			return;
		}

		if self.animating {
			debug!("queueing {name:?} behind {:?}", self.current);
			self.stop_requested = true;
			self.queue.push_back(name.to_owned());
			return;
		}

		let needs_reverse = self
			.current
			.as_ref()
			.and_then(|current| character.animation(current))
			.is_some_and(|animation| animation.transition() == TransitionType::ExitBranches);
		if needs_reverse {
			debug!("reversing {:?} before {name:?}", self.current);
			self.stop_requested = true;
			self.frame = self.frame.saturating_sub(1);
			self.deferred = Some(name.to_owned());
			self.step(character, host);
			return;
		}

		self.current = Some(name.to_owned());
		self.frame = 0;
		self.step(character, host);
	}

	/// Plays every animation a named state maps to, in stored order.
	///
	/// An unknown state is ignored.
	pub fn set_state<H: PlayerHost>(&mut self, character: &Character, host: &mut H, state: &str) {
		let Some(names) = character.state(state) else {
			warn!("no such state {state:?}");
			return;
		};
		for name in names {
			self.request(character, host, name);
		}
	}

	/// Asks the current animation to wind down via its exit frames.
	pub fn graceful_stop(&mut self) {
		if self.animating {
			self.stop_requested = true;
		}
	}

	/// Advances playback after a scheduled wakeup.
	///
	/// Decides the next frame from the one whose duration just elapsed: a
	/// pending stop follows the frame's exit frame if it has one, otherwise
	/// the branch table is rolled, otherwise the sequence advances. Stale
	/// tokens are ignored.
	pub fn tick<H: PlayerHost>(
		&mut self,
		character: &Character,
		host: &mut H,
		token: TickToken,
	) -> Result<(), PlayerError> {
		if token.epoch != self.epoch || !self.animating {
			return Ok(());
		}
		let Some(name) = self.current.clone() else {
			return Ok(());
		};
		let Some(animation) = character.animation(&name) else {
			return Ok(());
		};
		let frames = animation.frames();
		if self.frame >= frames.len() {
			self.complete(character, host);
			return Ok(());
		}
		let frame = &frames[self.frame];

		let exit_taken = self.stop_requested && frame.exit_frame() >= 0;
		if exit_taken {
			self.frame = frame.exit_frame() as usize;
		} else if frame.branches().is_empty() {
			if self.frame + 1 >= frames.len() {
				self.complete(character, host);
				return Ok(());
			}
			self.frame += 1;
		} else {
			let roll = self.rng.random_range(1..=100u8);
			match choose_branch(frame.branches(), roll)? {
				Some(index) => self.frame = usize::from(frame.branches()[index].frame_id),
				None => {
					if self.frame + 1 >= frames.len() {
						self.complete(character, host);
						return Ok(());
					}
					self.frame += 1;
				}
			}
		}

		self.step(character, host);
		Ok(())
	}

	/// Presents the current frame and schedules the wakeup that advances past it.
	fn step<H: PlayerHost>(&mut self, character: &Character, host: &mut H) {
		let Some(name) = self.current.clone() else {
			return;
		};
		let Some(animation) = character.animation(&name) else {
			return;
		};
		let frames = animation.frames();
		if self.frame >= frames.len() {
			self.complete(character, host);
			return;
		}
		self.animating = true;
		let frame = &frames[self.frame];

		if frame.images().is_empty() {
			if self.frame + 1 == frames.len() {
				// The imageless pose ending an exit sequence. A stop in
				// flight has reached its destination; otherwise rewind one
				// frame and go idle, keeping the animation current so a
				// later request can reverse out of it.
				if self.stop_requested {
					self.complete(character, host);
					return;
				}
				debug!("{name:?} parked on imageless final frame");
				self.animating = false;
				self.frame = self.frame.saturating_sub(1);
				host.render_frame(Self::frame_view(
					character,
					&name,
					self.frame,
					&frames[self.frame],
				));
				return;
			}
			self.frame += 1;
			self.step(character, host);
			return;
		}

		if frame.audio_index() != NO_SOUND {
			if let Some(sound) = character.sound(frame.audio_index()) {
				host.play_sound(sound.data());
			}
		}

		host.render_frame(Self::frame_view(character, &name, self.frame, frame));

		self.epoch += 1;
		host.schedule(
			Duration::from_millis(u64::from(frame.duration()) * TICK_MS),
			TickToken {
				epoch: self.epoch,
			},
		);
	}

	/// Finishes the current animation and starts whatever is waiting.
	fn complete<H: PlayerHost>(&mut self, character: &Character, host: &mut H) {
		debug!("animation {:?} completed", self.current);
		self.animating = false;
		self.stop_requested = false;
		self.current = None;
		self.frame = 0;

		let next = self.queue.pop_front().or_else(|| self.deferred.take());
		if let Some(next) = next {
			self.request(character, host, &next);
		}
		host.animation_completed();
	}

	fn frame_view<'a>(
		character: &'a Character,
		animation: &'a str,
		frame_index: usize,
		frame: &'a Frame,
	) -> FrameView<'a> {
		let images = frame
			.images()
			.iter()
			.filter_map(|layer| {
				character.image(layer.image_id).map(|image| FrameImageView {
					data: image.data(),
					width: image.width(),
					height: image.height(),
					row_stride: image.row_stride(),
					x: layer.x,
					y: layer.y,
				})
			})
			.collect();
		FrameView {
			animation,
			frame_index,
			images,
			palette: character.palette(),
			transparent_index: character.transparent_index(),
		}
	}
}

impl Default for Player {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// -----------------------------------------------------------------------
	// Byte-built character fixture
	// -----------------------------------------------------------------------

	fn push_string(out: &mut Vec<u8>, s: &str) {
		out.extend_from_slice(&(s.len() as u32).to_le_bytes());
		if s.is_empty() {
			return;
		}
		for c in s.chars() {
			out.extend_from_slice(&(c as u16).to_le_bytes());
		}
		out.extend_from_slice(&0u16.to_le_bytes());
	}

	fn push_locator(out: &mut Vec<u8>, offset: usize, size: usize) {
		out.extend_from_slice(&(offset as u32).to_le_bytes());
		out.extend_from_slice(&(size as u32).to_le_bytes());
	}

	fn patch_locator(buf: &mut [u8], at: usize, offset: usize, size: usize) {
		buf[at..at + 4].copy_from_slice(&(offset as u32).to_le_bytes());
		buf[at + 4..at + 8].copy_from_slice(&(size as u32).to_le_bytes());
	}

	fn frame_bytes(
		images: &[(u32, i16, i16)],
		audio: u16,
		duration: u16,
		exit: i16,
		branches: &[(u16, u16)],
	) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&(images.len() as u16).to_le_bytes());
		for &(id, x, y) in images {
			out.extend_from_slice(&id.to_le_bytes());
			out.extend_from_slice(&x.to_le_bytes());
			out.extend_from_slice(&y.to_le_bytes());
		}
		out.extend_from_slice(&audio.to_le_bytes());
		out.extend_from_slice(&duration.to_le_bytes());
		out.extend_from_slice(&exit.to_le_bytes());
		out.push(branches.len() as u8);
		for &(frame_id, probability) in branches {
			out.extend_from_slice(&frame_id.to_le_bytes());
			out.extend_from_slice(&probability.to_le_bytes());
		}
		out.push(0); // no overlays
		out
	}

	fn animation_bytes(name: &str, transition: u8, frames: &[Vec<u8>]) -> Vec<u8> {
		let mut out = Vec::new();
		push_string(&mut out, name);
		out.push(transition);
		push_string(&mut out, "");
		out.extend_from_slice(&(frames.len() as u16).to_le_bytes());
		for frame in frames {
			out.extend_from_slice(frame);
		}
		out
	}

	fn metadata_bytes() -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&0u16.to_le_bytes()); // minor version
		out.extend_from_slice(&2u16.to_le_bytes()); // major version
		out.extend_from_slice(&[0u8; 8]); // localized locator, patched
		out.extend_from_slice(&[0u8; 16]); // guid
		out.extend_from_slice(&4u16.to_le_bytes()); // width
		out.extend_from_slice(&1u16.to_le_bytes()); // height
		out.push(0); // transparent index
		out.extend_from_slice(&0u32.to_le_bytes()); // flags, no TTS
		out.extend_from_slice(&[0u8; 4]); // animation set version
		// balloon block
		out.push(1);
		out.push(10);
		out.extend_from_slice(&[0u8; 12]); // three colors
		push_string(&mut out, "");
		out.extend_from_slice(&0i32.to_le_bytes());
		out.extend_from_slice(&0i32.to_le_bytes());
		out.push(0);
		out.push(0);
		// two palette entries
		out.extend_from_slice(&2u32.to_le_bytes());
		out.extend_from_slice(&[0u8; 4]);
		out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0]);
		out.push(0); // no tray icon
		// one state
		out.extend_from_slice(&1u16.to_le_bytes());
		push_string(&mut out, "Greeting");
		out.extend_from_slice(&2u16.to_le_bytes());
		push_string(&mut out, "Wave");
		push_string(&mut out, "Bow");
		out
	}

	/// A character with one image, one sound and the animations the
	/// scenarios below need:
	///
	/// - `Wave`: two plain frames, the first with a sound
	/// - `Bow`: one plain frame
	/// - `Loop`: branches back to itself forever, exit frame 1
	/// - `Spin`: exit-branch transition ending in an imageless pose
	/// - `Blink`: imageless first frame
	fn build_character() -> Character {
		let mut out = Vec::new();
		out.extend_from_slice(&0xABCD_ABC3u32.to_le_bytes());
		out.extend_from_slice(&[0u8; 32]);

		let meta_offset = out.len();
		let mut metadata = metadata_bytes();
		let mut localized = Vec::new();
		localized.extend_from_slice(&1u16.to_le_bytes());
		localized.extend_from_slice(&9u16.to_le_bytes());
		push_string(&mut localized, "Mock");
		push_string(&mut localized, "");
		push_string(&mut localized, "");
		let localized_offset = meta_offset + metadata.len();
		patch_locator(&mut metadata, 4, localized_offset, localized.len());
		out.extend_from_slice(&metadata);
		out.extend_from_slice(&localized);

		// One uncompressed 4x1 image
		let image_offset = out.len();
		out.push(0);
		out.extend_from_slice(&4u16.to_le_bytes());
		out.extend_from_slice(&1u16.to_le_bytes());
		out.push(0);
		out.extend_from_slice(&4u32.to_le_bytes());
		out.extend_from_slice(&[1, 1, 0, 0]);
		out.extend_from_slice(&[0u8; 8]); // region sizes
		let image_size = out.len() - image_offset;
		let image_list_offset = out.len();
		out.extend_from_slice(&1u32.to_le_bytes());
		push_locator(&mut out, image_offset, image_size);
		out.extend_from_slice(&0u32.to_le_bytes());

		// One sound; playback never parses the container
		let sound_offset = out.len();
		out.extend_from_slice(b"RIFFdata");
		let sound_list_offset = out.len();
		out.extend_from_slice(&1u32.to_le_bytes());
		push_locator(&mut out, sound_offset, 8);
		out.extend_from_slice(&0u32.to_le_bytes());

		let img = [(0u32, 0i16, 0i16)];
		let names = ["Wave", "Bow", "Loop", "Spin", "Blink"];
		let blocks = [
			animation_bytes(
				"Wave",
				2,
				&[
					frame_bytes(&img, 0, 1, -1, &[]),
					frame_bytes(&img, NO_SOUND, 1, -1, &[]),
				],
			),
			animation_bytes("Bow", 2, &[frame_bytes(&img, NO_SOUND, 1, -1, &[])]),
			animation_bytes(
				"Loop",
				2,
				&[
					frame_bytes(&img, NO_SOUND, 1, 1, &[(0, 100)]),
					frame_bytes(&img, NO_SOUND, 1, -1, &[]),
				],
			),
			animation_bytes(
				"Spin",
				1,
				&[
					frame_bytes(&img, NO_SOUND, 1, 2, &[]),
					frame_bytes(&img, NO_SOUND, 1, 2, &[]),
					frame_bytes(&[], NO_SOUND, 1, -1, &[]),
				],
			),
			animation_bytes(
				"Blink",
				2,
				&[
					frame_bytes(&[], NO_SOUND, 1, -1, &[]),
					frame_bytes(&img, NO_SOUND, 1, -1, &[]),
				],
			),
		];
		let mut offsets = Vec::new();
		for block in &blocks {
			offsets.push((out.len(), block.len()));
			out.extend_from_slice(block);
		}
		let animation_list_offset = out.len();
		out.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
		for (name, &(offset, size)) in names.iter().zip(&offsets) {
			push_string(&mut out, name);
			push_locator(&mut out, offset, size);
		}

		let total = out.len();
		patch_locator(&mut out, 4, meta_offset, metadata.len());
		patch_locator(&mut out, 12, animation_list_offset, total - animation_list_offset);
		patch_locator(&mut out, 20, image_list_offset, sound_offset - image_list_offset);
		patch_locator(&mut out, 28, sound_list_offset, 16);

		Character::from_bytes(&out).unwrap()
	}

	// -----------------------------------------------------------------------
	// Mock host
	// -----------------------------------------------------------------------

	#[derive(Debug, PartialEq, Eq)]
	enum Event {
		Render(String, usize),
		Sound(usize),
		Completed,
	}

	#[derive(Default)]
	struct MockHost {
		events: Vec<Event>,
		scheduled: VecDeque<TickToken>,
	}

	impl PlayerHost for MockHost {
		fn render_frame(&mut self, frame: FrameView<'_>) {
			self.events
				.push(Event::Render(frame.animation.to_owned(), frame.frame_index));
		}

		fn play_sound(&mut self, data: &[u8]) {
			self.events.push(Event::Sound(data.len()));
		}

		fn animation_completed(&mut self) {
			self.events.push(Event::Completed);
		}

		fn schedule(&mut self, _delay: Duration, token: TickToken) {
			self.scheduled.push_back(token);
		}
	}

	/// Fires every pending wakeup until the player goes quiet.
	fn drive(player: &mut Player, character: &Character, host: &mut MockHost) {
		while let Some(token) = host.scheduled.pop_front() {
			player.tick(character, host, token).unwrap();
		}
	}

	fn render(animation: &str, frame: usize) -> Event {
		Event::Render(animation.to_owned(), frame)
	}

	// -----------------------------------------------------------------------
	// Scenarios
	// -----------------------------------------------------------------------

	#[test]
	fn test_request_plays_to_completion() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.request(&character, &mut host, "Bow");
		assert!(player.is_animating());
		drive(&mut player, &character, &mut host);

		assert_eq!(host.events, [render("Bow", 0), Event::Completed]);
		assert!(!player.is_animating());
		assert_eq!(player.current_animation(), None);
	}

	#[test]
	fn test_unknown_animation_is_ignored() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.request(&character, &mut host, "Moonwalk");

		assert!(host.events.is_empty());
		assert!(!player.is_animating());
	}

	#[test]
	fn test_frame_view_contents() {
		let character = build_character();
		let mut player = Player::from_seed(7);

		struct Inspect {
			seen: bool,
		}
		impl PlayerHost for Inspect {
			fn render_frame(&mut self, frame: FrameView<'_>) {
				assert_eq!(frame.animation, "Bow");
				assert_eq!(frame.images.len(), 1);
				assert_eq!(frame.images[0].width, 4);
				assert_eq!(frame.images[0].row_stride, 4);
				assert_eq!(frame.palette.len(), 2);
				assert_eq!(frame.transparent_index, 0);
				self.seen = true;
			}
			fn play_sound(&mut self, _data: &[u8]) {}
			fn animation_completed(&mut self) {}
			fn schedule(&mut self, _delay: Duration, _token: TickToken) {}
		}

		let mut inspect = Inspect {
			seen: false,
		};
		player.request(&character, &mut inspect, "Bow");
		assert!(inspect.seen);
	}

	#[test]
	fn test_state_plays_animations_in_order() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.set_state(&character, &mut host, "Greeting");
		drive(&mut player, &character, &mut host);

		// Wave starts immediately, Bow is queued behind it. The completion
		// callback for Wave lands after Bow's first frame because the next
		// animation starts before completion is reported.
		assert_eq!(
			host.events,
			[
				Event::Sound(8),
				render("Wave", 0),
				render("Wave", 1),
				render("Bow", 0),
				Event::Completed,
				Event::Completed,
			]
		);
	}

	#[test]
	fn test_unknown_state_is_ignored() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.set_state(&character, &mut host, "Brooding");
		assert!(host.events.is_empty());
	}

	#[test]
	fn test_graceful_stop_follows_exit_frame() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		// Loop branches back to frame 0 with probability 100
		player.request(&character, &mut host, "Loop");
		for _ in 0..3 {
			let token = host.scheduled.pop_front().unwrap();
			player.tick(&character, &mut host, token).unwrap();
		}
		assert_eq!(
			host.events,
			[render("Loop", 0), render("Loop", 0), render("Loop", 0), render("Loop", 0)]
		);

		player.graceful_stop();
		drive(&mut player, &character, &mut host);

		assert_eq!(
			host.events[4..],
			[render("Loop", 1), Event::Completed]
		);
		assert!(!player.is_animating());
	}

	#[test]
	fn test_exit_branch_animation_parks_then_reverses() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		// Spin ends on an imageless pose: the player rewinds one frame and
		// goes idle with the animation still current.
		player.request(&character, &mut host, "Spin");
		drive(&mut player, &character, &mut host);
		assert_eq!(
			host.events,
			[render("Spin", 0), render("Spin", 1), render("Spin", 1)]
		);
		assert!(!player.is_animating());
		assert_eq!(player.current_animation(), Some("Spin"));

		// The next request reverses out through the exit frames first
		player.request(&character, &mut host, "Bow");
		drive(&mut player, &character, &mut host);
		assert_eq!(
			host.events[3..],
			[
				render("Spin", 0),
				render("Bow", 0),
				Event::Completed,
				Event::Completed,
			]
		);
		assert_eq!(player.current_animation(), None);
	}

	#[test]
	fn test_imageless_leading_frame_is_skipped() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.request(&character, &mut host, "Blink");
		drive(&mut player, &character, &mut host);

		assert_eq!(host.events, [render("Blink", 1), Event::Completed]);
	}

	#[test]
	fn test_stale_token_is_ignored() {
		let character = build_character();
		let mut host = MockHost::default();
		let mut player = Player::from_seed(7);

		player.request(&character, &mut host, "Wave");
		let stale = host.scheduled.pop_front().unwrap();
		player.tick(&character, &mut host, stale).unwrap();
		let events_before = host.events.len();

		// Replaying the consumed token must not advance anything
		player.tick(&character, &mut host, stale).unwrap();
		assert_eq!(host.events.len(), events_before);

		drive(&mut player, &character, &mut host);
		assert_eq!(host.events.last(), Some(&Event::Completed));
	}
}
