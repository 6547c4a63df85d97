use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::{CutsceneError, Result};
use super::{AnalysisReport, Category, CategoryActions, CutsceneCollection, CutsceneConfig, DirectorCommand, DirectorEngine, PlaybackState};
use super::{PresentationContainer, SequenceOutcome, Sequencer, SessionController};

/// Resolves once an accepted sequence has handed off to the session controller
#[derive(Debug)]
pub struct SequenceHandle {
	category: Category,
	done: oneshot::Receiver<SequenceOutcome>,
}

impl SequenceHandle {
	pub fn category(&self) -> Category {
		self.category
	}

	pub async fn finished(self) -> Result<SequenceOutcome> {
		self.done.await.map_err(|_| CutsceneError::Internal("Engine dropped".into()))
	}
}

/// The cutscene director actor façade
pub struct CutsceneDirector {
	command_tx: mpsc::UnboundedSender<DirectorCommand>,
	state_rx: watch::Receiver<PlaybackState>,
	task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
	cancel_token: CancellationToken,
}

impl CutsceneDirector {
	/// Spawn a director with the default category routing
	pub fn new(
		collection: CutsceneCollection,
		config: CutsceneConfig,
		container: Arc<dyn PresentationContainer>,
		controller: Arc<dyn SessionController>,
	) -> Result<Self> {
		Self::with_actions(collection, config, CategoryActions::default(), container, controller)
	}

	pub fn with_actions(
		collection: CutsceneCollection,
		config: CutsceneConfig,
		actions: CategoryActions,
		container: Arc<dyn PresentationContainer>,
		controller: Arc<dyn SessionController>,
	) -> Result<Self> {
		config.validate()?;

		let cancel_token = CancellationToken::new();
		let (command_tx, command_rx) = mpsc::unbounded_channel();

		let engine = DirectorEngine::new(Sequencer::new(config, actions, container, controller), collection);
		let state_rx = engine.subscribe();

		let task_handle = tokio::spawn(engine.run(command_rx, cancel_token.clone()));

		info!("CutsceneDirector created");

		Ok(Self {
			command_tx,
			state_rx,
			task_handle: Arc::new(Mutex::new(Some(task_handle))),
			cancel_token,
		})
	}

	fn send(&self, cmd: DirectorCommand) -> Result<()> {
		self.command_tx.send(cmd).map_err(|_| CutsceneError::Internal("Failed to send command".into()))
	}

	async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T>>) -> DirectorCommand) -> Result<T> {
		let (tx, rx) = oneshot::channel();
		self.send(build(tx))?;
		rx.await.map_err(|_| CutsceneError::Internal("Engine dropped".into()))?
	}

	/// Start the sequence for `category`; rejected while another one plays
	pub async fn play(&self, category: Category) -> Result<SequenceHandle> {
		let (done_tx, done_rx) = oneshot::channel();
		self
			.request(|response| DirectorCommand::Play {
				category,
				response,
				done: done_tx,
			})
			.await?;
		Ok(SequenceHandle { category, done: done_rx })
	}

	/// Player skip input; ignored unless a sequence is showing
	pub fn skip(&self) -> Result<()> {
		self.send(DirectorCommand::Skip)
	}

	pub async fn analyze_all(&self) -> Result<AnalysisReport> {
		self.request(|response| DirectorCommand::AnalyzeAll { response }).await
	}

	pub async fn set_manual_duration(&self, index: usize, secs: f32) -> Result<()> {
		self.request(|response| DirectorCommand::SetManualDuration { index, secs, response }).await
	}

	pub async fn clear_manual_duration(&self, index: usize) -> Result<()> {
		self.request(|response| DirectorCommand::ClearManualDuration { index, response }).await
	}

	pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
		self.request(|response| DirectorCommand::SetEnabled { enabled, response }).await
	}

	/// Current collection, including analysis results
	pub async fn collection(&self) -> Result<Arc<CutsceneCollection>> {
		let (tx, rx) = oneshot::channel();
		self.send(DirectorCommand::Snapshot { response: tx })?;
		rx.await.map_err(|_| CutsceneError::Internal("Engine dropped".into()))
	}

	// Access state
	pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
		self.state_rx.clone()
	}
	pub fn current_state(&self) -> PlaybackState {
		self.state_rx.borrow().clone()
	}

	/// Stop the engine; an active sequence is skipped so its instance is released
	pub async fn shutdown(&self) {
		self.cancel_token.cancel();
		if let Some(handle) = self.task_handle.lock().await.take() {
			let _ = handle.await;
		}
	}
}
