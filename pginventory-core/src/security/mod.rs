//! Credential handling.
//!
//! Credentials are accepted as input only: they are held in zeroize-on-drop
//! containers, handed to the driver as discrete connect options, and never
//! written to logs, errors or reports.

mod credentials;

pub use credentials::{DEFAULT_PORT, ServerCredentials};
