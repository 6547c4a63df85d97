use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Result of one cooperative suspension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
	Elapsed,
	Skipped,
}

/// Suspend for `duration` unless the skip token fires first.
///
/// The token is checked before suspending so an already-skipped session
/// never sleeps.
pub(crate) async fn pause(duration: Duration, skip: &CancellationToken) -> Wait {
	if skip.is_cancelled() {
		return Wait::Skipped;
	}

	tokio::select! {
		biased;
		() = skip.cancelled() => Wait::Skipped,
		() = sleep(duration) => {
			if skip.is_cancelled() {
				Wait::Skipped
			} else {
				Wait::Elapsed
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::time::Instant;

	#[tokio::test(start_paused = true)]
	async fn elapses_without_skip() {
		let skip = CancellationToken::new();
		let started = Instant::now();
		assert_eq!(pause(Duration::from_millis(500), &skip).await, Wait::Elapsed);
		assert_eq!(started.elapsed(), Duration::from_millis(500));
	}

	#[tokio::test(start_paused = true)]
	async fn already_skipped_returns_immediately() {
		let skip = CancellationToken::new();
		skip.cancel();
		let started = Instant::now();
		assert_eq!(pause(Duration::from_secs(10), &skip).await, Wait::Skipped);
		assert_eq!(started.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn skip_interrupts_suspension() {
		let skip = CancellationToken::new();
		let trigger = skip.clone();
		tokio::spawn(async move {
			sleep(Duration::from_millis(200)).await;
			trigger.cancel();
		});

		let started = Instant::now();
		assert_eq!(pause(Duration::from_secs(10), &skip).await, Wait::Skipped);
		assert_eq!(started.elapsed(), Duration::from_millis(200));
	}
}
