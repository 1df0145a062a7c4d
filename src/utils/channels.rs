//! One-shot completion channels
//!
//! Platform operations that finish later (a permission prompt, a play request)
//! hand back a [`Completion`]. The owning controller polls it from the event
//! loop instead of blocking.

use crate::Result;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

pub type Completion<T> = Receiver<Result<T>>;

/// Observed state of a pending completion
#[derive(Debug)]
pub enum CompletionState<T> {
    /// No answer yet
    Pending,
    /// The operation finished
    Ready(Result<T>),
    /// The sender went away without answering
    Abandoned,
}

/// Create a completion pair
pub fn completion<T>() -> (Sender<Result<T>>, Completion<T>) {
    bounded(1)
}

/// A completion that is already resolved
pub fn resolved<T>(value: Result<T>) -> Completion<T> {
    let (tx, rx) = completion();
    // Capacity 1 and a fresh channel, so this cannot fail
    let _ = tx.send(value);
    rx
}

/// Check a completion without blocking
pub fn poll_completion<T>(rx: &Completion<T>) -> CompletionState<T> {
    match rx.try_recv() {
        Ok(value) => CompletionState::Ready(value),
        Err(TryRecvError::Empty) => CompletionState::Pending,
        Err(TryRecvError::Disconnected) => CompletionState::Abandoned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProseError;

    #[test]
    fn test_pending_then_ready() {
        let (tx, rx) = completion::<u32>();
        assert!(matches!(poll_completion(&rx), CompletionState::Pending));
        tx.send(Ok(7)).unwrap();
        assert!(matches!(poll_completion(&rx), CompletionState::Ready(Ok(7))));
    }

    #[test]
    fn test_dropped_sender_is_abandoned() {
        let (tx, rx) = completion::<()>();
        drop(tx);
        assert!(matches!(poll_completion(&rx), CompletionState::Abandoned));
    }

    #[test]
    fn test_resolved_error() {
        let rx = resolved::<()>(Err(ProseError::PlaybackFailure("blocked".into())));
        assert!(matches!(
            poll_completion(&rx),
            CompletionState::Ready(Err(ProseError::PlaybackFailure(_)))
        ));
    }
}
