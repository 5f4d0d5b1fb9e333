//! Request/response correlation.
//!
//! The pending table is the only shared mutable state. The router and the
//! timeout scheduler are two independent producers racing to resolve the
//! same entry; the table guarantees exactly one of them is observed.

pub mod pending;
pub mod router;
pub mod timeout;

pub use pending::{cleanup_task, Outcome, PendingHandle, PendingRequestTable, PendingStats};
pub use router::ResponseRouter;
pub use timeout::{TimeoutHandle, TimeoutScheduler};
