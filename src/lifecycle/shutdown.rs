//! Shutdown coordination and request termination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown of the HTTP host.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Ends the current request once a routed response has been emitted.
///
/// Process-per-request hosts exit; long-running hosts simply return.
pub trait Terminate: Send + Sync {
    fn terminate(&self);
}

/// Exit the process with status 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcess;

impl Terminate for ExitProcess {
    fn terminate(&self) {
        tracing::debug!("Request handled, exiting");
        std::process::exit(0);
    }
}

/// No-op termination for hosts that serve many requests per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndRequest;

impl Terminate for EndRequest {
    fn terminate(&self) {}
}

impl<F> Terminate for F
where
    F: Fn() + Send + Sync,
{
    fn terminate(&self) {
        self()
    }
}
