//! Process-interrupt plumbing shared by a whole role run.
//!
//! `tokio::signal::ctrl_c` permanently replaces the default SIGINT
//! disposition the first time it is polled, so the watcher has to outlive
//! any single session: one task owns the signal stream for the whole run
//! and forwards every interrupt into a watch channel. Consumers take a
//! fresh [`InterruptWatch`] per use; it only fires for interrupts delivered
//! after it was taken, so an interrupt that already ended a chat loop does
//! not leak into the prompt that follows.

use tokio::sync::watch;
use tracing::warn;

/// Role-scoped SIGINT watcher. Install once per run, before the first
/// session starts.
pub struct Interrupt {
    signal: watch::Receiver<bool>,
}

impl Interrupt {
    pub fn install() -> Self {
        let (tx, signal) = watch::channel(false);
        tokio::spawn(async move {
            loop {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(?error, "ctrl-c handler failed");
                    break;
                }
                if tx.send(true).is_err() {
                    break;
                }
            }
        });
        Self { signal }
    }

    /// A watch that fires for interrupts delivered from now on.
    pub fn watch(&self) -> InterruptWatch {
        InterruptWatch::from_signal(self.signal.clone())
    }
}

/// One consumer's view of the interrupt stream.
pub struct InterruptWatch(watch::Receiver<bool>);

impl InterruptWatch {
    /// A watch that never fires, for contexts with no interrupt source.
    pub fn disarmed() -> Self {
        let (_, signal) = watch::channel(false);
        Self(signal)
    }

    pub(crate) fn from_signal(mut signal: watch::Receiver<bool>) -> Self {
        // Mark the current value as seen so only interrupts delivered from
        // now on wake this watch.
        signal.borrow_and_update();
        Self(signal)
    }

    /// Resolves on the next interrupt. Pends forever when the watcher is
    /// gone. Cancel-safe, so it can sit in a `select!` loop.
    pub async fn recv(&mut self) {
        while self.0.changed().await.is_ok() {
            if *self.0.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}
