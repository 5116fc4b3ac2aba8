//! Server-level error types

use crate::database::StoreError;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that end the server run
#[derive(Debug, Error)]
pub enum ServerError {
    /// Store connection failed at startup
    #[error("database connection failed: {0}")]
    Store(#[from] StoreError),

    /// Listener could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// OS signal handlers could not be installed
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// Listener failed while serving or closing
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

impl ServerError {
    /// Every server error is fatal
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Process exit status for the outcome of a server run
pub fn exit_status(outcome: &std::result::Result<(), ServerError>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}

/// A specialized Result type for server runs
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(())), 0);
        assert_eq!(exit_status(&Err(StoreError::MissingUri.into())), 1);
        assert_eq!(
            exit_status(&Err(ServerError::Serve(io::Error::other("listener closed")))),
            1
        );
    }

    #[test]
    fn test_messages() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:4000".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 0.0.0.0:4000: address in use");
        assert_eq!(
            ServerError::from(StoreError::MissingUri).to_string(),
            "database connection failed: MONGO_URI is not set"
        );
    }
}
