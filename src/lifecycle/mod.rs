//! Startup and shutdown sequencing
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Configuration Loading
//!    ↓
//! 2. Store Connect                     ← fatal on failure (exit 1)
//!    ↓
//! 3. Listener Bind
//!    ↓
//! [Serving...]
//!    ↓
//! 4. Shutdown Trigger (SIGINT/SIGTERM/supervised task failure)
//!    ↓
//! 5. Drain In-flight Requests
//!    ↓
//! 6. Store Disconnect
//!    ↓
//! 7. Exit (0 clean, 1 listener failure)
//! ```

mod application;
mod error;
mod shutdown;

pub use application::{ApplicationServer, build_router};
pub use error::{Result, ServerError, exit_status};
pub use shutdown::{ShutdownHandle, ShutdownReason, listen_for_signals, spawn_supervised};
