use thiserror::Error;

use super::Category;

pub type Result<T> = std::result::Result<T, CutsceneError>;

#[derive(Debug, Error)]
pub enum CutsceneError {
	#[error("Entry index {index} out of range (collection has {len} entries)")]
	IndexOutOfRange { index: usize, len: usize },

	#[error("Invalid manual duration: {0}s (must be positive and finite)")]
	InvalidDuration(f32),

	#[error("A {0} sequence is already playing")]
	SequenceActive(Category),

	#[error("Asset inspection failed: {0}")]
	Asset(String),

	#[error("Presentation error: {0}")]
	Presentation(String),

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Manifest error: {0}")]
	Manifest(#[from] serde_json::Error),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl CutsceneError {
	/// Errors that are logged and absorbed instead of ending anything
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::SequenceActive(_) | Self::Asset(_) | Self::Presentation(_))
	}
}
