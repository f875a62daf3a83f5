//! Prelude module for `agent_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use agent_types::prelude::*;
//!
//! let character = Character::open("genie.acs");
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Error type
	AcsError,

	// Character types
	AcsCharacter,
	Character,
};

// Asset model types
#[doc(inline)]
pub use crate::file::acs::{
	Animation, BalloonInfo, Branch, Frame, FrameImage, Guid, Image, Locator, MouthOverlay, Rgb,
	Sound, TransitionType, VoiceExtraInfo, VoiceInfo, NO_SOUND, TICK_MS,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
