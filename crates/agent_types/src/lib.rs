//! This crate provides the binary format support and asset model for the `agent-rs` project.
//!
//! # File Formats
//!
//! - **ACS**: Agent 2.x character files containing metadata, a color palette,
//!   palette-indexed images, RIFF sound containers and branching animations
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use agent_types::prelude::*;
//!
//! # fn main() -> Result<(), AcsError> {
//! let character = Character::open("genie.acs")?;
//! println!("{} ({}x{})", character.name(), character.width(), character.height());
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use agent_types::file::acs::Character;
//!
//! let character = Character::open("genie.acs");
//! // ...
//! ```

pub mod file;

/// `use agent_types::prelude::*;` to import commonly used items.
pub mod prelude;
