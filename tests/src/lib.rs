//! # Session RPC Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── request_flow.rs    # Requester side: results, errors, deadlines
//!     └── responder_flow.rs  # Responder side: queueing, rejection, expiry
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p session-rpc-tests
//!
//! # With logs
//! RUST_LOG=session_rpc=debug cargo test -p session-rpc-tests -- --nocapture
//! ```

pub mod integration;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once. Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
