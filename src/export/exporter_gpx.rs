//! GPX export of a synchronized ride track.
//!
//! Produces a GPX 1.1 document with a single track and track segment.
//! Speed, heart rate, cadence and power travel in the Garmin track-point
//! and power extension namespaces; an absent reading renders as an empty
//! element (or empty `lat`/`lon` attribute), never as "0" or "null".

use crate::export::sampler::TrackSample;
use crate::export::{format_track_time, reading_text, write_element, ExportError};
use crate::records::types::Ride;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// GPX XML namespaces
const NS_GPX: &str = "http://www.topografix.com/GPX/1/1";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const NS_TPX: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v2";
const NS_PWR: &str = "http://www.garmin.com/xmlschemas/PowerExtension/v1";
const SCHEMA_LOCATION: &str = "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd http://www.garmin.com/xmlschemas/TrackPointExtension/v2 http://www.garmin.com/xmlschemas/TrackPointExtensionv2.xsd http://www.garmin.com/xmlschemas/PowerExtension/v1 http://www.garmin.com/xmlschemas/PowerExtensionv1.xsd";

const CREATOR: &str = "rideport";

/// Export a synchronized ride to GPX, stamped with the current wall-clock
/// time as the document generation time.
pub fn export_gpx(ride: &Ride, samples: &[TrackSample]) -> Result<String, ExportError> {
    export_gpx_at(ride, samples, Utc::now())
}

/// Export a synchronized ride to GPX with an explicit generation time.
///
/// Apart from the `<metadata><time>` element, the output depends only on
/// the ride, so exporting the same ride twice is byte-identical.
pub fn export_gpx_at(
    ride: &Ride,
    samples: &[TrackSample],
    generated_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("xmlns", NS_GPX));
    root.push_attribute(("xmlns:xsi", NS_XSI));
    root.push_attribute(("creator", CREATOR));
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("xmlns:gpxtpx", NS_TPX));
    root.push_attribute(("xmlns:pwr", NS_PWR));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("metadata")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(&mut writer, "time", &format_track_time(generated_at))?;
    writer
        .write_event(Event::End(BytesEnd::new("metadata")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("trk")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(&mut writer, "name", &ride.title)?;

    writer
        .write_event(Event::Start(BytesStart::new("trkseg")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    for sample in samples {
        write_trackpoint(&mut writer, sample)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("trkseg")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("trk")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("gpx")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| ExportError::Xml(e.to_string()))
}

/// Write a single track point with its extension block.
fn write_trackpoint<W: std::io::Write>(
    writer: &mut Writer<W>,
    sample: &TrackSample,
) -> Result<(), ExportError> {
    // lat/lon are always present as attributes, empty when unknown.
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", reading_text(sample.latitude).as_str()));
    trkpt.push_attribute(("lon", reading_text(sample.longitude).as_str()));
    writer
        .write_event(Event::Start(trkpt))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    write_element(writer, "ele", &reading_text(sample.altitude))?;
    write_element(writer, "time", &format_track_time(sample.time))?;

    writer
        .write_event(Event::Start(BytesStart::new("extensions")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::Start(BytesStart::new("gpxtpx:TrackPointExtension")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    write_element(writer, "gpxtpx:speed", &reading_text(sample.speed))?;
    write_element(writer, "gpxtpx:hr", &reading_text(sample.heart_rate))?;
    write_element(writer, "gpxtpx:cad", &reading_text(sample.cadence))?;
    write_element(writer, "pwr:PowerInWatts", &reading_text(sample.power))?;

    writer
        .write_event(Event::End(BytesEnd::new("gpxtpx:TrackPointExtension")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("extensions")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("trkpt")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(())
}
