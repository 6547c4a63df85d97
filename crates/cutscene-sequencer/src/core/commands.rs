use std::sync::Arc;
use tokio::sync::oneshot;

use super::error::Result;
use super::{AnalysisReport, Category, CutsceneCollection, SequenceOutcome};

/// Internal command type used inside the director engine
#[derive(Debug)]
pub enum DirectorCommand {
	// Sequence control
	Play {
		category: Category,
		response: oneshot::Sender<Result<()>>,
		done: oneshot::Sender<SequenceOutcome>,
	},

	// Fire-and-forget
	Skip,

	// Collection edits, rejected while a sequence is playing
	AnalyzeAll {
		response: oneshot::Sender<Result<AnalysisReport>>,
	},
	SetManualDuration {
		index: usize,
		secs: f32,
		response: oneshot::Sender<Result<()>>,
	},
	ClearManualDuration {
		index: usize,
		response: oneshot::Sender<Result<()>>,
	},
	SetEnabled {
		enabled: bool,
		response: oneshot::Sender<Result<()>>,
	},

	Snapshot {
		response: oneshot::Sender<Arc<CutsceneCollection>>,
	},
}
