//! This crate provides the animation playback engine for the `agent-rs` project.
//!
//! Playback is an externally driven state machine: the [`Player`] tracks which
//! animation is current and which frame it is on, while everything that
//! touches the outside world (drawing, sound, timing) goes through a
//! [`PlayerHost`] supplied by the caller. After presenting a frame the player
//! asks the host to schedule a wakeup; the host calls [`Player::tick`] back
//! with the token it was handed, and the player decides the next frame from
//! the branch tables and any pending stop request.
//!
//! # Examples
//!
//! ```no_run
//! use agent_player::{Player, PlayerHost, FrameView, TickToken};
//! use agent_types::prelude::*;
//! use std::time::Duration;
//!
//! struct Console;
//!
//! impl PlayerHost for Console {
//! 	fn render_frame(&mut self, frame: FrameView<'_>) {
//! 		println!("{} frame {}", frame.animation, frame.frame_index);
//! 	}
//! 	fn play_sound(&mut self, data: &[u8]) {
//! 		println!("sound ({} bytes)", data.len());
//! 	}
//! 	fn animation_completed(&mut self) {
//! 		println!("done");
//! 	}
//! 	fn schedule(&mut self, _delay: Duration, _token: TickToken) {
//! 		// a real host arms a timer; see Player::tick
//! 	}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let character = Character::open("genie.acs")?;
//! let mut player = Player::new();
//! let mut host = Console;
//! player.request(&character, &mut host, "Greet");
//! # Ok(())
//! # }
//! ```

mod branch;
mod error;
mod host;
mod player;

pub use branch::choose_branch;
pub use error::PlayerError;
pub use host::{FrameImageView, FrameView, PlayerHost, TickToken};
pub use player::Player;
