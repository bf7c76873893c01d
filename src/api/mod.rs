//! Teamleader API module
//!
//! Authenticated request executor for the Teamleader Focus API

pub mod client;

pub use client::{http_client, ApiError, ClientError, TeamleaderClient, DEFAULT_BASE_URL};
