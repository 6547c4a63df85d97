mod collection;
mod commands;
mod config;
mod detector;
mod director;
mod engine;
mod entry;
mod error;
mod manifest;
mod ports;
mod resolver;
mod sequencer;
mod session;
mod state;
mod wait;

pub use collection::{AnalysisReport, CategoryIndices, CutsceneCollection};
pub use config::{CategoryActions, CategoryRoute, CutsceneConfig, LoopFlagPolicy, SessionAction};
pub use detector::{Completion, CompletionDetector, EntryTiming};
pub use director::{CutsceneDirector, SequenceHandle};
pub use entry::{AssetRef, AuthoredAsset, Category, ClipInfo, CutsceneEntry, VisualAsset};
pub use error::{CutsceneError, Result};
pub use manifest::{CutsceneManifest, ManifestEntry};
pub use ports::{InstanceHandle, InstanceProgress, NoProgress, PresentationContainer, ProgressSource, SessionController};
pub use resolver::{resolve, ClipAnalysis};
pub use sequencer::SequenceOutcome;
pub use session::PlaybackSession;
pub use state::{PlaybackState, SequencePhase};

use commands::DirectorCommand;
use engine::DirectorEngine;
use sequencer::Sequencer;
