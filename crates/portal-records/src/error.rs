//! Error types for portal-records.
//!
//! Records calls share the portal-client taxonomy: template failures,
//! API-reported failures, and transport failures all surface as
//! [`ErrorKind`] variants so callers match on one type.

pub use portal_api_client::{Error, ErrorKind, Result};
