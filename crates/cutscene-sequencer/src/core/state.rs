use serde::{Deserialize, Serialize};

use super::{Category, Completion};

/// Where a category sequence currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum SequencePhase {
	Idle,
	Starting,
	PlayingEntry { index: usize },
	Transitioning { from: usize, to: usize },
	Completed,
	Skipped,
}

impl SequencePhase {
	/// Phases in which a skip is honored
	pub fn is_skippable(self) -> bool {
		matches!(self, Self::PlayingEntry { .. } | Self::Transitioning { .. })
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Skipped)
	}
}

/// Observable playback state, published on every phase change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
	pub category: Option<Category>,
	pub phase: SequencePhase,
	/// Cursor into the category's entries
	pub position: usize,
	pub entry_count: usize,
	pub last_completion: Option<Completion>,
}

impl PlaybackState {
	pub fn idle() -> Self {
		Self {
			category: None,
			phase: SequencePhase::Idle,
			position: 0,
			entry_count: 0,
			last_completion: None,
		}
	}

	pub fn is_active(&self) -> bool {
		!matches!(self.phase, SequencePhase::Idle) && !self.phase.is_terminal()
	}
}

impl Default for PlaybackState {
	fn default() -> Self {
		Self::idle()
	}
}
