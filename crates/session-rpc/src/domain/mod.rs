//! Domain types for the session RPC engine.
//!
//! Configuration, errors and the permission policy. Async machinery lives
//! in `correlation` and `dispatcher`.

pub mod config;
pub mod error;
pub mod permissions;

pub use config::{
    ClientConfig, ConfigError, PendingConfig, RelayConfig, RequestConfig, MAX_REQUEST_TIMEOUT,
};
pub use error::{codes, RequestError, RequestResult};
pub use permissions::authorize;
