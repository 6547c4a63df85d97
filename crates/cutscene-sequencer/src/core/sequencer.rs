use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::wait::{pause, Wait};
use super::{Category, CategoryActions, Completion, CompletionDetector, CutsceneCollection, CutsceneConfig, CutsceneEntry, EntryTiming};
use super::{InstanceProgress, PlaybackSession, PlaybackState, PresentationContainer, SequencePhase, SessionController};

/// How a category sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceOutcome {
	/// Every entry played through
	Completed,
	Skipped,
	/// Nothing authored for the category; the fallback action ran instead
	NothingToPlay,
	/// An index lookup failed; treated like completion
	Aborted,
}

/// Drives one category's entries through instantiate, trigger, wait and
/// transition, then hands off to the session controller exactly once.
///
/// Holds no re-entrancy guard of its own; only the director engine calls
/// `play`, one sequence at a time.
pub struct Sequencer {
	detector: CompletionDetector,
	actions: CategoryActions,
	container: Arc<dyn PresentationContainer>,
	controller: Arc<dyn SessionController>,
	state_tx: watch::Sender<PlaybackState>,
}

impl Sequencer {
	pub fn new(config: CutsceneConfig, actions: CategoryActions, container: Arc<dyn PresentationContainer>, controller: Arc<dyn SessionController>) -> Self {
		let (state_tx, _) = watch::channel(PlaybackState::idle());
		Self {
			detector: CompletionDetector::new(config),
			actions,
			container,
			controller,
			state_tx,
		}
	}

	pub fn config(&self) -> &CutsceneConfig {
		self.detector.config()
	}

	pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
		self.state_tx.subscribe()
	}

	/// Play every entry of `category` in collection order.
	///
	/// `skip` is checked at every suspension point; once cancelled the
	/// category's skip action runs instead of its completion action.
	pub async fn play(&self, collection: &CutsceneCollection, category: Category, skip: CancellationToken) -> SequenceOutcome {
		let route = self.actions.route(category);
		let indices = collection.indices_by_category(category);

		self.state_tx.send_replace(PlaybackState {
			category: Some(category),
			phase: SequencePhase::Starting,
			position: 0,
			entry_count: indices.len(),
			last_completion: None,
		});

		if !collection.has_playable_for(category) {
			info!("No {} cutscenes to play; proceeding directly", category);
			self.set_phase(SequencePhase::Completed);
			route.on_empty.dispatch(self.controller.as_ref());
			return SequenceOutcome::NothingToPlay;
		}

		info!("Starting {} sequence ({} entries)", category, indices.len());
		let mut session = PlaybackSession::new(category, indices, skip);
		self.container.show_overlay();

		let outcome = self.drive(collection, &mut session).await;

		session.finish(self.container.as_ref());
		self.container.hide_overlay();

		match outcome {
			SequenceOutcome::Skipped => {
				info!("{} sequence skipped", category);
				self.set_phase(SequencePhase::Skipped);
				route.on_skip.dispatch(self.controller.as_ref());
			}
			_ => {
				info!("{} sequence finished ({:?})", category, outcome);
				self.set_phase(SequencePhase::Completed);
				route.on_complete.dispatch(self.controller.as_ref());
			}
		}

		outcome
	}

	async fn drive(&self, collection: &CutsceneCollection, session: &mut PlaybackSession) -> SequenceOutcome {
		while let Some(index) = session.current_index() {
			if session.is_skipped() {
				return SequenceOutcome::Skipped;
			}

			let entry = match collection.get(index) {
				Ok(entry) => entry,
				Err(e) => {
					error!("Aborting {} sequence: {}", session.category(), e);
					return SequenceOutcome::Aborted;
				}
			};

			let position = session.position();
			self.state_tx.send_modify(|state| {
				state.phase = SequencePhase::PlayingEntry { index };
				state.position = position;
			});

			let completion = self.play_entry(entry, index, session).await;
			self.state_tx.send_modify(|state| state.last_completion = Some(completion));

			if completion.is_skipped() {
				return SequenceOutcome::Skipped;
			}
			if session.is_last() {
				break;
			}

			let next = session.indices()[position + 1];
			self.set_phase(SequencePhase::Transitioning { from: index, to: next });
			if pause(self.config().transition_pause(), session.skip_token()).await == Wait::Skipped {
				return SequenceOutcome::Skipped;
			}
			session.advance();
		}

		SequenceOutcome::Completed
	}

	async fn play_entry(&self, entry: &CutsceneEntry, index: usize, session: &mut PlaybackSession) -> Completion {
		session.release_active(self.container.as_ref());

		let Some(asset) = entry.asset() else {
			warn!("Cutscene entry {} has no visual asset; waiting the default duration", index);
			return self.detector.wait_missing(session.skip_token()).await;
		};

		let handle = match self.container.instantiate(asset) {
			Ok(handle) => handle,
			Err(e) => {
				warn!("Could not instantiate '{}' (entry {}): {}; waiting the default duration", asset.name(), index, e);
				return self.detector.wait_missing(session.skip_token()).await;
			}
		};
		session.attach(handle, self.container.as_ref());

		let Some(handle) = session.active() else {
			return Completion::Missing;
		};

		if let Err(e) = self.container.request_playback_start(handle, &self.config().trigger_name) {
			warn!("Playback start failed for '{}': {}", asset.name(), e);
		}

		if !entry.is_analyzed() && !entry.uses_manual_duration() {
			debug!("Entry {} ('{}') was never analyzed; using the default duration", index, entry.label());
		}

		let timing = EntryTiming::for_entry(entry, self.config());
		debug!("Playing entry {} ('{}') for ~{:?}", index, entry.label(), timing.expected);

		let progress = InstanceProgress::new(self.container.as_ref(), handle);
		self.detector.wait(timing, &progress, session.skip_token()).await
	}

	fn set_phase(&self, phase: SequencePhase) {
		self.state_tx.send_modify(|state| state.phase = phase);
	}
}
