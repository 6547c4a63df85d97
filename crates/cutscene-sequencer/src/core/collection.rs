use smallvec::SmallVec;
use tracing::info;

use super::error::{CutsceneError, Result};
use super::{Category, CutsceneEntry, LoopFlagPolicy};

/// Category-filtered entry indices, in collection order
pub type CategoryIndices = SmallVec<[usize; 8]>;

/// Counts produced by [`CutsceneCollection::analyze_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisReport {
	pub analyzed: usize,
	pub failed: usize,
}

/// Ordered container of cutscene entries.
///
/// Order is meaningful: within a category, playback follows list order.
#[derive(Debug, Clone)]
pub struct CutsceneCollection {
	enabled: bool,
	entries: Vec<CutsceneEntry>,
}

impl CutsceneCollection {
	pub fn new() -> Self {
		Self {
			enabled: true,
			entries: Vec::new(),
		}
	}

	pub fn from_entries(entries: Vec<CutsceneEntry>) -> Self {
		Self { enabled: true, entries }
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> &[CutsceneEntry] {
		&self.entries
	}

	/// Append an entry and return its index
	pub fn add(&mut self, entry: CutsceneEntry) -> usize {
		self.entries.push(entry);
		self.entries.len() - 1
	}

	pub fn remove(&mut self, index: usize) -> Result<CutsceneEntry> {
		self.check_index(index)?;
		Ok(self.entries.remove(index))
	}

	pub fn get(&self, index: usize) -> Result<&CutsceneEntry> {
		self.entries.get(index).ok_or(CutsceneError::IndexOutOfRange { index, len: self.entries.len() })
	}

	pub fn get_mut(&mut self, index: usize) -> Result<&mut CutsceneEntry> {
		let len = self.entries.len();
		self.entries.get_mut(index).ok_or(CutsceneError::IndexOutOfRange { index, len })
	}

	/// Indices of every entry in `category`, never reordered
	pub fn indices_by_category(&self, category: Category) -> CategoryIndices {
		self
			.entries
			.iter()
			.enumerate()
			.filter(|(_, entry)| entry.category() == category)
			.map(|(index, _)| index)
			.collect()
	}

	pub fn effective_duration(&self, index: usize) -> Result<f32> {
		self.get(index).map(CutsceneEntry::effective_duration)
	}

	/// Sum of effective durations over entries that have an asset
	pub fn total_duration(&self) -> f32 {
		self.entries.iter().filter(|e| e.asset().is_some()).map(CutsceneEntry::effective_duration).sum()
	}

	pub fn category_duration(&self, category: Category) -> f32 {
		self
			.entries
			.iter()
			.filter(|e| e.category() == category && e.asset().is_some())
			.map(CutsceneEntry::effective_duration)
			.sum()
	}

	/// True iff enabled and at least one entry has an asset
	pub fn has_any_playable(&self) -> bool {
		self.enabled && self.entries.iter().any(|e| e.asset().is_some())
	}

	/// True iff enabled and `category` itself has at least one entry with an asset
	pub fn has_playable_for(&self, category: Category) -> bool {
		self.enabled && self.entries.iter().any(|e| e.category() == category && e.asset().is_some())
	}

	pub fn analyze_all(&mut self, policy: LoopFlagPolicy) -> AnalysisReport {
		let mut report = AnalysisReport::default();
		for entry in &mut self.entries {
			entry.analyze(policy);
			report.analyzed += 1;
			if entry.last_error().is_some() {
				report.failed += 1;
			}
		}
		info!("Analyzed {} cutscene entries ({} with errors)", report.analyzed, report.failed);
		report
	}

	fn check_index(&self, index: usize) -> Result<()> {
		if index < self.entries.len() {
			Ok(())
		} else {
			Err(CutsceneError::IndexOutOfRange { index, len: self.entries.len() })
		}
	}
}

impl Default for CutsceneCollection {
	fn default() -> Self {
		Self::new()
	}
}
