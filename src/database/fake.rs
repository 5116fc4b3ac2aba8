//! In-process stand-in for the store, used by lifecycle and server tests

use super::{StoreConnector, StoreError, StoreHandle, StoreObservers};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Counters {
    connects: AtomicUsize,
    closes: AtomicUsize,
}

#[derive(Default)]
pub(crate) struct FakeConnector {
    connect_error: Option<String>,
    close_error: Option<String>,
    counters: Arc<Counters>,
    observers: Mutex<Option<StoreObservers>>,
}

impl FakeConnector {
    pub(crate) fn failing_connect(message: &str) -> Self {
        Self {
            connect_error: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub(crate) fn failing_close(message: &str) -> Self {
        Self {
            close_error: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub(crate) fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    /// Observers handed over by the last successful connect
    pub(crate) fn observers(&self) -> Option<StoreObservers> {
        self.observers.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreConnector for FakeConnector {
    type Handle = FakeHandle;

    async fn connect(
        &self,
        uri: &str,
        observers: StoreObservers,
    ) -> Result<FakeHandle, StoreError> {
        if let Some(message) = &self.connect_error {
            return Err(StoreError::Connect(message.clone()));
        }

        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        *self.observers.lock().unwrap() = Some(observers);
        Ok(FakeHandle {
            uri: uri.to_owned(),
            close_error: self.close_error.clone(),
            counters: Arc::clone(&self.counters),
        })
    }
}

#[derive(Clone)]
pub(crate) struct FakeHandle {
    pub(crate) uri: String,
    close_error: Option<String>,
    counters: Arc<Counters>,
}

#[async_trait]
impl StoreHandle for FakeHandle {
    fn host(&self) -> String {
        "fake:27017".to_owned()
    }

    fn name(&self) -> String {
        "app".to_owned()
    }

    async fn close(self) -> Result<(), StoreError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        match self.close_error {
            Some(message) => Err(StoreError::Close(message)),
            None => Ok(()),
        }
    }
}
