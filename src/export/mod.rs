//! Track reconstruction and export.
//!
//! Turns the parallel per-sample arrays of a downloaded ride into a
//! time-stamped track and renders it as a GPX or KML document.

pub mod batch;
pub mod exporter_gpx;
pub mod exporter_kml;
pub mod sampler;

pub use batch::{export_path, BatchReport, FileFailure};
pub use exporter_gpx::export_gpx;
pub use exporter_kml::export_kml;
pub use sampler::{synchronize, TrackSample, TrackSamples};

use crate::records::types::{Reading, RecordError, Ride};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

/// Errors during track export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A per-sample array holds fewer segment-0 entries than the
    /// coordinate array, so the record cannot be aligned
    #[error("sample array {array} has {actual} entries in segment 0, expected {expected}")]
    SampleArrayTooShort {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Record could not be loaded or parsed
    #[error(transparent)]
    Record(#[from] RecordError),

    /// XML generation error
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Target track format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    /// GPX 1.1 with Garmin track-point and power extensions
    Gpx,
    /// KML with Google track extension and OpenTracks fields
    Kml,
}

impl TrackFormat {
    /// File extension of the rendered output.
    pub fn extension(&self) -> &'static str {
        match self {
            TrackFormat::Gpx => "gpx",
            TrackFormat::Kml => "kml",
        }
    }

    /// Synchronize the ride's samples and render the full document.
    pub fn render(&self, ride: &Ride) -> Result<String, ExportError> {
        let samples: Vec<TrackSample> = synchronize(ride)?.collect();
        match self {
            TrackFormat::Gpx => export_gpx(ride, &samples),
            TrackFormat::Kml => export_kml(ride, &samples),
        }
    }
}

impl std::fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackFormat::Gpx => write!(f, "GPX"),
            TrackFormat::Kml => write!(f, "KML"),
        }
    }
}

/// Write a simple element with text content.
pub(crate) fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(())
}

/// Render a reading as the exporters emit it: the source encoding for a
/// present value, an empty string for an absent one.
pub(crate) fn reading_text(value: Option<Reading>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// ISO-8601 timestamp without a UTC offset, as both exporters emit it.
/// The microsecond part is printed (six digits) only when non-zero.
pub(crate) fn format_track_time(time: DateTime<Utc>) -> String {
    let base = time.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = time.timestamp_subsec_micros();
    if micros == 0 {
        base
    } else {
        format!("{base}.{micros:06}")
    }
}
