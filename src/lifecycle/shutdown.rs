//! Graceful shutdown coordination
//!
//! A single [`ShutdownHandle`] is shared by everything that may end the
//! process: the OS signal listener and supervised background tasks. The first
//! trigger wins; any later trigger is logged and dropped, so the shutdown
//! sequence runs exactly once.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What started the shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// A supervised background task failed or panicked
    TaskFailed { task: String, message: String },
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
            Self::TaskFailed { task, message } => write!(f, "task {task} failed: {message}"),
        }
    }
}

struct Inner {
    reason: OnceLock<ShutdownReason>,
    triggered: watch::Sender<bool>,
}

/// Cloneable trigger shared by everything that can stop the server
#[derive(Clone)]
pub struct ShutdownHandle {
    inner: Arc<Inner>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (triggered, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                reason: OnceLock::new(),
                triggered,
            }),
        }
    }

    /// Start the shutdown sequence
    ///
    /// Returns `false` when a shutdown is already under way, in which case
    /// `reason` is only logged.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        match self.inner.reason.set(reason) {
            Ok(()) => {
                if let Some(reason) = self.reason() {
                    tracing::info!("{} received. Shutting down gracefully...", reason);
                }
                self.inner.triggered.send_replace(true);
                true
            }
            Err(reason) => {
                tracing::warn!("{} received while already shutting down, ignoring", reason);
                false
            }
        }
    }

    /// The reason of the first trigger, if any
    pub fn reason(&self) -> Option<&ShutdownReason> {
        self.inner.reason.get()
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.borrow()
    }

    /// Resolves once the shutdown has been triggered
    pub fn triggered(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.inner.triggered.subscribe();
        async move {
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("reason", &self.reason())
            .finish()
    }
}

/// Forward termination signals to `shutdown` for as long as the process runs
///
/// Handlers stay installed after the first signal, so a repeated signal is
/// absorbed by [`ShutdownHandle::trigger`] instead of killing the process
/// halfway through the shutdown sequence.
#[cfg(unix)]
pub fn listen_for_signals(shutdown: ShutdownHandle) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let reason = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownReason::Interrupt,
                Some(()) = terminate.recv() => ShutdownReason::Terminate,
                else => break,
            };
            shutdown.trigger(reason);
        }
    }))
}

#[cfg(not(unix))]
pub fn listen_for_signals(shutdown: ShutdownHandle) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger(ShutdownReason::Interrupt);
        }
    }))
}

/// Spawn a background task whose failure brings the server down
///
/// An `Err` return or a panic triggers `shutdown` with
/// [`ShutdownReason::TaskFailed`]. Clean completion and cancellation do not.
pub fn spawn_supervised<F, E>(
    shutdown: &ShutdownHandle,
    task: impl Into<String>,
    future: F,
) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let task = task.into();
    let shutdown = shutdown.clone();
    let worker = tokio::spawn(future);

    tokio::spawn(async move {
        let message = match worker.await {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(err) if err.is_cancelled() => return,
            Err(err) => err.to_string(),
        };

        tracing::error!(%task, "Background task failed: {}", message);
        shutdown.trigger(ShutdownReason::TaskFailed { task, message });
    })
}
