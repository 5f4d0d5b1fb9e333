//! Session permission checks.
//!
//! Methods must match an authorized name exactly; there are no wildcards.
//! A session that lists chains is chain-scoped: every request on it must
//! name one of those chains.

use crate::domain::error::{RequestError, RequestResult};
use shared_types::Session;

/// Placeholder reported when a chain-scoped request names no chain.
pub const MISSING_CHAIN_ID: &str = "<missing>";

/// Check `method` and `chain_id` against the session's permissions.
///
/// The method is checked first, so a request failing both checks reports
/// the method.
pub fn authorize(session: &Session, method: &str, chain_id: Option<&str>) -> RequestResult<()> {
    let permissions = &session.permissions;

    if !permissions.allows_method(method) {
        return Err(RequestError::unauthorized_method(method));
    }

    match chain_id {
        Some(chain) if permissions.is_chain_scoped() && !permissions.allows_chain(chain) => {
            Err(RequestError::unauthorized_chain(chain))
        }
        None if permissions.is_chain_scoped() => {
            Err(RequestError::unauthorized_chain(MISSING_CHAIN_ID))
        }
        _ => Ok(()),
    }
}
