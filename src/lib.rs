//! Rideport - Portal Ride Downloader & Track Exporter
//!
//! Downloads ride activities from an e-bike portal, persists the raw
//! records as JSON, and reconstructs them into time-stamped GPX or KML
//! tracks from the portal's per-sample telemetry arrays.

pub mod export;
pub mod portal;
pub mod records;

// Re-export commonly used types
pub use export::{export_path, ExportError, TrackFormat};
pub use portal::PortalClient;
pub use records::{Activity, Reading, Ride, RideHeader};
