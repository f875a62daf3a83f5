//! File type support for the `agent-rs` project.

mod error;

pub mod acs;

// Re-export unified error type
pub use error::AcsError;

// Re-export main file types
pub use acs::Character;
pub use acs::Character as AcsCharacter;
