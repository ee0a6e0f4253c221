//! # portal-client
//!
//! Core HTTP infrastructure for envelope-style portal APIs.
//!
//! This crate provides:
//! - A transport bound to one base address, with JSON default headers and a
//!   cookie jar shared across calls
//! - Request building and log-safe request/response dumps
//! - The response envelope (`ResultInfos` + `ResultData`) decoder
//! - One error type covering template, API-reported, and transport failures
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    portal-records                           │
//! │  - Templates, paginated search, insert/update               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    portal-auth                              │
//! │  - Login credentials, session token                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PortalHttpClient                         │
//! │  - One request per call, no retry                           │
//! │  - Envelope decoding, error-log dumps                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error log
//!
//! Conditions worth keeping an operator's record of are emitted as DEBUG
//! `tracing` events under [`ERROR_LOG_TARGET`]. The binary routes that
//! target to an append-only file.

mod client;
mod config;
pub mod envelope;
mod error;
mod request;
mod response;

pub use client::PortalHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use envelope::{ApiFailure, Envelope, FileId, FileIdData, ResultInfos, RowsData, TokenData};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod, AUTH_HEADER};
pub use response::Response;

/// `tracing` target of error-log entries.
pub const ERROR_LOG_TARGET: &str = "portal_api::error_log";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("portal-api/", env!("CARGO_PKG_VERSION"));
