//! Store connection lifecycle
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected --disconnect--> Disconnected
//!                               |
//!                               +--err--> Disconnected (fatal for the server)
//! ```
//!
//! [`DatabaseLifecycle`] owns the single store handle of the process. The
//! driver itself sits behind [`StoreConnector`] so tests can run the
//! lifecycle against a fake store.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strum_macros::Display;
use thiserror::Error;
use tokio::sync::{Mutex, watch};

pub mod mongo;
pub mod users;

#[cfg(test)]
pub(crate) mod fake;

pub use mongo::{MongoConnector, MongoHandle};
pub use users::UserRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MONGO_URI is not set")]
    MissingUri,

    #[error("store connection is already {0}")]
    AlreadyConnected(ConnectionState),

    #[error("{0}")]
    Connect(String),

    #[error("failed to close store connection: {0}")]
    Close(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

type DisconnectCallback = dyn Fn(&str) + Send + Sync;
type ErrorCallback = dyn Fn(&str, &str) + Send + Sync;

/// Standing observers attached to the store handle
///
/// Both are log-only by default. They stay silent until the lifecycle arms
/// them after a successful connect, and are disarmed again before an
/// intentional close.
#[derive(Clone)]
pub struct StoreObservers {
    armed: Arc<AtomicBool>,
    on_disconnect: Arc<DisconnectCallback>,
    on_error: Arc<ErrorCallback>,
}

impl StoreObservers {
    pub fn new(
        on_disconnect: impl Fn(&str) + Send + Sync + 'static,
        on_error: impl Fn(&str, &str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            on_disconnect: Arc::new(on_disconnect),
            on_error: Arc::new(on_error),
        }
    }

    /// The store at `address` went away
    pub fn notify_disconnect(&self, address: &str) {
        if self.is_armed() {
            (self.on_disconnect)(address);
        }
    }

    /// The store at `address` reported a connection-level error
    pub fn notify_error(&self, address: &str, error: &str) {
        if self.is_armed() {
            (self.on_error)(address, error);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }
}

impl Default for StoreObservers {
    fn default() -> Self {
        Self::new(
            |address| tracing::warn!(%address, "Database disconnected"),
            |address, error| tracing::error!(%address, %error, "Database error"),
        )
    }
}

impl fmt::Debug for StoreObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreObservers")
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}

/// Opens connections to the persistent store
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Handle: StoreHandle;

    /// Establish a connection and attach `observers` to it
    ///
    /// Must only return once the store has answered, so that a `Connected`
    /// lifecycle really means a usable store.
    async fn connect(&self, uri: &str, observers: StoreObservers)
    -> Result<Self::Handle, StoreError>;
}

/// A live connection to the store
#[async_trait]
pub trait StoreHandle: Send + Sync + 'static {
    fn host(&self) -> String;

    fn name(&self) -> String;

    async fn close(self) -> Result<(), StoreError>;
}

/// Owns the process-wide store connection
pub struct DatabaseLifecycle<C: StoreConnector> {
    connector: C,
    observers: StoreObservers,
    state: watch::Sender<ConnectionState>,
    handle: Mutex<Option<C::Handle>>,
}

impl<C: StoreConnector> DatabaseLifecycle<C> {
    pub fn new(connector: C) -> Self {
        Self::with_observers(connector, StoreObservers::default())
    }

    pub fn with_observers(connector: C, observers: StoreObservers) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            observers,
            state,
            handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connect to the store
    ///
    /// A missing URI or a driver failure leaves the lifecycle `Disconnected`
    /// and is returned to the caller, which treats it as fatal.
    pub async fn connect(&self, uri: Option<&str>) -> Result<(), StoreError> {
        let mut slot = self.handle.lock().await;

        let current = self.state();
        if current != ConnectionState::Disconnected {
            return Err(StoreError::AlreadyConnected(current));
        }

        let Some(uri) = uri.map(str::trim).filter(|uri| !uri.is_empty()) else {
            tracing::error!("DB connection failed: {}", StoreError::MissingUri);
            return Err(StoreError::MissingUri);
        };

        self.state.send_replace(ConnectionState::Connecting);
        match self.connector.connect(uri, self.observers.clone()).await {
            Ok(handle) => {
                tracing::info!("Database connected: {}", handle.host());
                tracing::info!("Database name: {}", handle.name());
                self.observers.arm();
                *slot = Some(handle);
                self.state.send_replace(ConnectionState::Connected);
                Ok(())
            }
            Err(err) => {
                tracing::error!("DB connection failed: {}", err);
                self.state.send_replace(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    /// Close the store connection
    ///
    /// Idempotent. Close errors are logged and swallowed so shutdown can
    /// always proceed.
    pub async fn disconnect(&self) {
        let mut slot = self.handle.lock().await;
        let Some(handle) = slot.take() else {
            tracing::debug!("Database already disconnected");
            return;
        };

        self.observers.disarm();
        match handle.close().await {
            Ok(()) => tracing::info!("Database connection closed cleanly"),
            Err(err) => tracing::error!("Error closing database connection: {}", err),
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

impl<C> DatabaseLifecycle<C>
where
    C: StoreConnector,
    C::Handle: Clone,
{
    /// A clone of the live handle, if connected
    pub async fn current(&self) -> Option<C::Handle> {
        self.handle.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeConnector;
    use super::*;
    use std::sync::Mutex as StdMutex;

    const URI: &str = "mongodb://fake:27017/app";

    #[tokio::test]
    async fn test_connect_then_disconnect() {
        let db = DatabaseLifecycle::new(FakeConnector::default());
        assert_eq!(db.state(), ConnectionState::Disconnected);

        db.connect(Some(URI)).await.unwrap();
        assert_eq!(db.state(), ConnectionState::Connected);
        assert_eq!(db.connector().connects(), 1);
        assert_eq!(db.current().await.unwrap().uri, URI);

        db.disconnect().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert_eq!(db.connector().closes(), 1);
        assert!(db.current().await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        let db = DatabaseLifecycle::new(FakeConnector::default());
        db.connect(Some(URI)).await.unwrap();

        db.disconnect().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        db.disconnect().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);

        assert_eq!(db.connector().closes(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        let db = DatabaseLifecycle::new(FakeConnector::default());
        db.disconnect().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert_eq!(db.connector().closes(), 0);
    }

    #[tokio::test]
    async fn test_missing_uri_is_fatal() {
        let db = DatabaseLifecycle::new(FakeConnector::default());

        assert!(matches!(db.connect(None).await, Err(StoreError::MissingUri)));
        assert!(matches!(
            db.connect(Some("   ")).await,
            Err(StoreError::MissingUri)
        ));
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert_eq!(db.connector().connects(), 0);
    }

    #[tokio::test]
    async fn test_driver_failure_returns_to_disconnected() {
        let db = DatabaseLifecycle::new(FakeConnector::failing_connect("auth failed"));
        let mut states = db.subscribe();

        let err = db.connect(Some(URI)).await.unwrap_err();
        assert_eq!(err.to_string(), "auth failed");
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_second_connect_is_rejected() {
        let db = DatabaseLifecycle::new(FakeConnector::default());
        db.connect(Some(URI)).await.unwrap();

        let err = db.connect(Some(URI)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::AlreadyConnected(ConnectionState::Connected)
        ));
        assert_eq!(db.connector().connects(), 1);
    }

    #[tokio::test]
    async fn test_close_error_is_swallowed() {
        let db = DatabaseLifecycle::new(FakeConnector::failing_close("socket hung up"));
        db.connect(Some(URI)).await.unwrap();

        db.disconnect().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        db.disconnect().await;
        assert_eq!(db.connector().closes(), 1);
    }

    #[tokio::test]
    async fn test_observers_fire_only_while_connected() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let disconnects = Arc::clone(&seen);
        let errors = Arc::clone(&seen);
        let observers = StoreObservers::new(
            move |address| disconnects.lock().unwrap().push(format!("down {address}")),
            move |address, error| errors.lock().unwrap().push(format!("{address}: {error}")),
        );

        let db = DatabaseLifecycle::with_observers(FakeConnector::default(), observers.clone());

        observers.notify_error("fake:27017", "before connect");
        db.connect(Some(URI)).await.unwrap();
        assert!(observers.is_armed());

        let attached = db.connector().observers().unwrap();
        attached.notify_error("fake:27017", "heartbeat failed");
        attached.notify_disconnect("fake:27017");

        db.disconnect().await;
        attached.notify_disconnect("fake:27017");

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["fake:27017: heartbeat failed", "down fake:27017"]
        );
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(
            StoreError::AlreadyConnected(ConnectionState::Connected).to_string(),
            "store connection is already connected"
        );
    }
}
