//! `agent-rs` loads legacy animated agent character files and plays their
//! animations.
//!
//! The work is split across two member crates, re-exported here:
//!
//! - [`types`] (`agent_types`) loads the binary format and owns the asset
//!   model: character metadata, palette, images, sounds and animation
//!   sequences
//! - [`player`] (`agent_player`): the tick-driven playback engine that walks
//!   animations through a host-supplied renderer, audio sink and scheduler
//!
//! # Examples
//!
//! ```no_run
//! use agent_rs::prelude::*;
//!
//! # fn main() -> Result<(), AcsError> {
//! let character = Character::open("genie.acs")?;
//! println!("{}: {}", character.name(), character.description());
//! # Ok(())
//! # }
//! ```

pub use agent_player as player;
pub use agent_types as types;

pub use agent_types::prelude;
