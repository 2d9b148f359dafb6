//! Shared `ureq` agent construction.
//!
//! Requests are blocking: the caller does not proceed until a response body
//! has been fully consumed or the request has failed. Only connection
//! establishment is bounded; body transfer is not, so large archives are
//! never cut off mid-download.

use std::time::Duration;

/// Default bound on establishing a connection to a remote host.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an agent with the given connect timeout.
///
/// Non-2xx responses surface as [`ureq::Error::StatusCode`].
///
/// # Examples
///
/// ```
/// use opensource_fetch::remote::http::{DEFAULT_CONNECT_TIMEOUT, http_agent};
///
/// let _agent = http_agent(DEFAULT_CONNECT_TIMEOUT);
/// ```
#[must_use]
pub fn http_agent(connect_timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(connect_timeout))
        .http_status_as_error(true)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Return true when the error is an HTTP 404 response.
#[must_use]
pub fn is_not_found(err: &ureq::Error) -> bool {
    matches!(err, ureq::Error::StatusCode(404))
}
