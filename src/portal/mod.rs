//! Portal API integration.
//!
//! Cookie-authenticated, blocking HTTP client for the ride portal:
//! login, activity listing and ride detail download.

pub mod client;

pub use client::{PortalClient, PortalError};
