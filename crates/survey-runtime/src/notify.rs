//! Status notifications with a deferred reset.
//!
//! Posting a notification cancels any pending reset before scheduling its
//! own, so a message always stays up for the full reset period and an old
//! timer never clears a newer message.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Shown while a submission is in flight.
pub const SAVING: &str = "Saving... Please wait.";
/// Shown after an accepted submission.
pub const SAVED: &str = "Data saved successfully!";
/// Shown when the record list cannot be fetched.
pub const LOAD_FAILED: &str = "Failed to load data.";
/// Shown when an export has nothing to write.
pub const NO_DATA: &str = "No data to export!";

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Progress.
    Info,
    /// An action completed.
    Success,
    /// An action failed.
    Error,
}

/// A user-visible status message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Message text.
    pub message: String,
}

impl Notification {
    /// Progress message.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Completion message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Failure message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Confirmation of a written export.
    pub fn exported(file_name: &str) -> Self {
        Self::success(format!("Exported {file_name}"))
    }
}

#[derive(Default)]
struct BoardState {
    current: Option<Notification>,
    pending_reset: Option<CancellationToken>,
}

/// Holder of the current notification.
///
/// [`post`](Self::post) spawns the reset timer on the ambient tokio runtime.
#[derive(Clone)]
pub struct StatusBoard {
    state: Arc<Mutex<BoardState>>,
    reset_after: Duration,
}

impl StatusBoard {
    /// Board whose notifications clear after `reset_after`.
    pub fn new(reset_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::default())),
            reset_after,
        }
    }

    /// Time a notification stays up.
    pub const fn reset_after(&self) -> Duration {
        self.reset_after
    }

    /// The notification currently shown, if any.
    pub fn current(&self) -> Option<Notification> {
        self.state.lock().current.clone()
    }

    /// Show `notification`, replacing the current one and rescheduling the
    /// reset.
    pub fn post(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::warn!(message = %notification.message, "notification");
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(message = %notification.message, "notification");
            }
        }

        let token = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if let Some(previous) = state.pending_reset.replace(token.clone()) {
                previous.cancel();
            }
            state.current = Some(notification);
        }

        let state = Arc::clone(&self.state);
        let delay = self.reset_after;
        let _ = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    let mut state = state.lock();
                    // A newer post cancels this token under the same lock.
                    if !token.is_cancelled() {
                        state.current = None;
                        state.pending_reset = None;
                    }
                }
                () = token.cancelled() => {}
            }
        });
    }

    /// Clear the board now and cancel the pending reset.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if let Some(pending) = state.pending_reset.take() {
            pending.cancel();
        }
        state.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn notification_resets_after_delay() {
        let board = StatusBoard::new(Duration::from_millis(5_000));
        board.post(Notification::success(SAVED));
        assert_eq!(board.current().unwrap().message, SAVED);

        advance(4_999).await;
        assert!(board.current().is_some());
        advance(2).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_post_cancels_pending_reset() {
        let board = StatusBoard::new(Duration::from_millis(5_000));
        board.post(Notification::info(SAVING));
        advance(3_000).await;
        board.post(Notification::error(LOAD_FAILED));

        // the first timer would have fired here
        advance(2_500).await;
        let current = board.current().unwrap();
        assert_eq!(current.message, LOAD_FAILED);
        assert_eq!(current.level, NotificationLevel::Error);

        advance(2_600).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_reset() {
        let board = StatusBoard::new(Duration::from_millis(100));
        board.post(Notification::info("one"));
        board.clear();
        assert!(board.current().is_none());
        board.post(Notification::info("two"));
        advance(50).await;
        assert_eq!(board.current().unwrap().message, "two");
    }

    #[test]
    fn exported_message() {
        assert_eq!(
            Notification::exported("SurveyData.xlsx").message,
            "Exported SurveyData.xlsx"
        );
    }
}
