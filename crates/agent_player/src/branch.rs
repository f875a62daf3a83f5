//! Weighted branch selection.

use agent_types::prelude::Branch;

use crate::error::PlayerError;

/// Picks a branch from a frame's probability table.
///
/// `roll` is a percentage in `[1, 100]`. Probabilities are cumulative: a table
/// of 30/30/30 maps rolls 1..=30 to the first branch, 31..=60 to the second,
/// 61..=90 to the third and leaves 91..=100 unassigned, which means "advance
/// to the next frame" and returns `None`. A table summing past 100 is a data
/// error.
pub fn choose_branch(branches: &[Branch], roll: u8) -> Result<Option<usize>, PlayerError> {
	let total: u32 = branches.iter().map(|b| u32::from(b.probability)).sum();
	if total > 100 {
		return Err(PlayerError::InvalidProbabilityTable {
			total,
		});
	}

	let mut cumulative = 0u32;
	for (index, branch) in branches.iter().enumerate() {
		cumulative += u32::from(branch.probability);
		if u32::from(roll) <= cumulative {
			return Ok(Some(index));
		}
	}

	Ok(None)
}
