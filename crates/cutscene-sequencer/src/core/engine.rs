use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{CutsceneError, Result};
use super::{Category, CutsceneCollection, DirectorCommand, PlaybackState, SequenceOutcome, Sequencer};

type SequenceFuture = Pin<Box<dyn Future<Output = SequenceOutcome> + Send>>;

// ============================================================================
// ActiveSequence - the one sequence allowed to run at a time
// ============================================================================

struct ActiveSequence {
	category: Category,
	skip: CancellationToken,
	future: SequenceFuture,
	done: oneshot::Sender<SequenceOutcome>,
}

impl ActiveSequence {
	fn finish(self, outcome: SequenceOutcome) {
		debug!("{} sequence settled: {:?}", self.category, outcome);
		let _ = self.done.send(outcome);
	}
}

// ============================================================================
// DirectorEngine
// ============================================================================

/// Actor owning the collection and the single active sequence
pub struct DirectorEngine {
	sequencer: Arc<Sequencer>,
	collection: Arc<CutsceneCollection>,
}

impl DirectorEngine {
	pub fn new(sequencer: Sequencer, mut collection: CutsceneCollection) -> Self {
		if collection.entries().iter().any(|e| !e.is_analyzed()) {
			collection.analyze_all(sequencer.config().loop_flag_policy);
		}

		info!("DirectorEngine created ({} entries)", collection.len());
		Self {
			sequencer: Arc::new(sequencer),
			collection: Arc::new(collection),
		}
	}

	pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
		self.sequencer.subscribe()
	}

	pub async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<DirectorCommand>, cancel: CancellationToken) {
		let mut active: Option<ActiveSequence> = None;

		info!("Director engine started");

		loop {
			tokio::select! {
				// Poll the sequence only while one is running
				outcome = async {
					match active.as_mut() {
						Some(sequence) => sequence.future.as_mut().await,
						None => std::future::pending::<SequenceOutcome>().await,
					}
				} => {
					if let Some(sequence) = active.take() {
						sequence.finish(outcome);
					}
				}

				cmd = command_rx.recv() => {
					let Some(cmd) = cmd else {
						Self::wind_down(active.take()).await;
						info!("Director handle dropped; engine stopping");
						break;
					};
					self.handle_command(cmd, &mut active);
				}

				() = cancel.cancelled() => {
					Self::wind_down(active.take()).await;
					info!("Director engine cancelled");
					break;
				}
			}
		}
	}

	/// Skip whatever is running so its instance is released before the engine goes away
	async fn wind_down(active: Option<ActiveSequence>) {
		if let Some(mut sequence) = active {
			sequence.skip.cancel();
			let outcome = sequence.future.as_mut().await;
			sequence.finish(outcome);
		}
	}

	fn handle_command(&mut self, command: DirectorCommand, active: &mut Option<ActiveSequence>) {
		match command {
			DirectorCommand::Play { category, response, done } => {
				let result = if let Some(running) = active.as_ref() {
					warn!("Rejecting {} sequence: {} sequence is still playing", category, running.category);
					Err(CutsceneError::SequenceActive(running.category))
				} else {
					*active = Some(self.start_sequence(category, done));
					Ok(())
				};
				let _ = response.send(result);
			}

			DirectorCommand::Skip => match active {
				Some(running) if !running.skip.is_cancelled() => {
					info!("Skip requested for {} sequence", running.category);
					running.skip.cancel();
				}
				Some(_) => debug!("Skip already requested"),
				None => debug!("Skip ignored: no cutscene is showing"),
			},

			DirectorCommand::AnalyzeAll { response } => {
				let policy = self.sequencer.config().loop_flag_policy;
				let result = self.edit_collection(active.as_ref(), |collection| Ok(collection.analyze_all(policy)));
				let _ = response.send(result);
			}

			DirectorCommand::SetManualDuration { index, secs, response } => {
				let result = self.edit_collection(active.as_ref(), |collection| collection.get_mut(index)?.set_manual_duration(secs));
				let _ = response.send(result);
			}

			DirectorCommand::ClearManualDuration { index, response } => {
				let result = self.edit_collection(active.as_ref(), |collection| {
					collection.get_mut(index)?.clear_manual_duration();
					Ok(())
				});
				let _ = response.send(result);
			}

			DirectorCommand::SetEnabled { enabled, response } => {
				let result = self.edit_collection(active.as_ref(), |collection| {
					collection.set_enabled(enabled);
					Ok(())
				});
				let _ = response.send(result);
			}

			DirectorCommand::Snapshot { response } => {
				let _ = response.send(Arc::clone(&self.collection));
			}
		}
	}

	fn start_sequence(&self, category: Category, done: oneshot::Sender<SequenceOutcome>) -> ActiveSequence {
		let skip = CancellationToken::new();
		let sequencer = Arc::clone(&self.sequencer);
		let collection = Arc::clone(&self.collection);
		let token = skip.clone();

		info!("Accepted {} sequence", category);
		ActiveSequence {
			category,
			skip,
			future: Box::pin(async move { sequencer.play(&collection, category, token).await }),
			done,
		}
	}

	/// Collection edits only happen between sequences
	fn edit_collection<T>(&mut self, active: Option<&ActiveSequence>, edit: impl FnOnce(&mut CutsceneCollection) -> Result<T>) -> Result<T> {
		if let Some(running) = active {
			warn!("Collection is locked while the {} sequence plays", running.category);
			return Err(CutsceneError::SequenceActive(running.category));
		}
		edit(Arc::make_mut(&mut self.collection))
	}
}
