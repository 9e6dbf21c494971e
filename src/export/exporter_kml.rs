//! KML export of a synchronized ride track.
//!
//! Produces a KML document with one `Placemark` wrapping a `gx:MultiTrack`.
//! Track points are emitted as `<when>`/`<gx:coord>` pairs; speed, power,
//! cadence and heart rate travel positionally in a `SchemaData` block that
//! is fed from the same synchronized sample sequence, so both passes stay
//! index-aligned.
//!
//! The `<when>` value is the offset-free timestamp with a literal "Z"
//! appended. That suffix is cosmetic, not a UTC conversion; consumers of
//! the historical files expect it as-is.

use crate::export::sampler::TrackSample;
use crate::export::{format_track_time, reading_text, write_element, ExportError};
use crate::records::types::{Reading, Ride};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// KML XML namespaces
const NS_KML: &str = "http://www.opengis.net/kml/2.2";
const NS_GX: &str = "http://www.google.com/kml/ext/2.2";
const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
const NS_OPENTRACKS: &str = "http://opentracksapp.com/xmlschemas/v1";

const GENERATOR: &str = "rideport";
const TRACK_TYPE: &str = "cyclism";
const TRACK_ICON: &str = "BIKE";

/// The four custom float arrays declared by the document schema, with the
/// sample field each one is fed from.
const ARRAY_FIELDS: [(&str, &str, fn(&TrackSample) -> Option<Reading>); 4] = [
    ("speed", "Speed (m/s)", |s| s.speed),
    ("power", "Power (W)", |s| s.power),
    ("cadence", "Cadence (rpm)", |s| s.cadence),
    ("heart_rate", "Heart rate (bpm)", |s| s.heart_rate),
];

/// Export a synchronized ride to KML.
pub fn export_kml(ride: &Ride, samples: &[TrackSample]) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    let mut root = BytesStart::new("kml");
    root.push_attribute(("xmlns", NS_KML));
    root.push_attribute(("xmlns:gx", NS_GX));
    root.push_attribute(("xmlns:atom", NS_ATOM));
    root.push_attribute(("xmlns:opentracks", NS_OPENTRACKS));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("Document")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    write_element(&mut writer, "open", "1")?;
    write_element(&mut writer, "visibility", "1")?;
    write_element(&mut writer, "name", &ride.title)?;
    write_element(&mut writer, "atom:generator", GENERATOR)?;

    write_styles(&mut writer)?;
    write_schema(&mut writer)?;
    write_placemark(&mut writer, ride, samples)?;

    writer
        .write_event(Event::End(BytesEnd::new("Document")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("kml")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| ExportError::Xml(e.to_string()))
}

/// Line and icon styles for the track and its waypoints.
fn write_styles<W: std::io::Write>(writer: &mut Writer<W>) -> Result<(), ExportError> {
    let mut track_style = BytesStart::new("Style");
    track_style.push_attribute(("id", "track"));
    writer
        .write_event(Event::Start(track_style))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("LineStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(writer, "color", "7f0000ff")?;
    write_element(writer, "width", "4")?;
    writer
        .write_event(Event::End(BytesEnd::new("LineStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("IconStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(writer, "scale", "1.3")?;
    writer
        .write_event(Event::Empty(BytesStart::new("Icon")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("IconStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("Style")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    let mut waypoint_style = BytesStart::new("Style");
    waypoint_style.push_attribute(("id", "waypoint"));
    writer
        .write_event(Event::Start(waypoint_style))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::Start(BytesStart::new("IconStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::Empty(BytesStart::new("Icon")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("IconStyle")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("Style")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(())
}

/// Declaration of the four custom float arrays.
fn write_schema<W: std::io::Write>(writer: &mut Writer<W>) -> Result<(), ExportError> {
    let mut schema = BytesStart::new("Schema");
    schema.push_attribute(("id", "schema"));
    writer
        .write_event(Event::Start(schema))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    for (name, display_name, _) in ARRAY_FIELDS {
        let mut field = BytesStart::new("gx:SimpleArrayField");
        field.push_attribute(("name", name));
        field.push_attribute(("type", "float"));
        writer
            .write_event(Event::Start(field))
            .map_err(|e| ExportError::Xml(e.to_string()))?;
        write_element(writer, "displayName", display_name)?;
        writer
            .write_event(Event::End(BytesEnd::new("gx:SimpleArrayField")))
            .map_err(|e| ExportError::Xml(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Schema")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(())
}

fn write_placemark<W: std::io::Write>(
    writer: &mut Writer<W>,
    ride: &Ride,
    samples: &[TrackSample],
) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new("Placemark")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    write_element(writer, "name", &ride.title)?;
    write_element(writer, "icon", TRACK_ICON)?;
    write_element(writer, "opentracks:trackid", &ride.id)?;
    write_element(writer, "styleUrl", "#track")?;

    writer
        .write_event(Event::Start(BytesStart::new("ExtendedData")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("name", "type"));
    writer
        .write_event(Event::Start(data))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(writer, "value", TRACK_TYPE)?;
    writer
        .write_event(Event::End(BytesEnd::new("Data")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("ExtendedData")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("gx:MultiTrack")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    write_element(writer, "altitudeMode", "absolute")?;
    write_element(writer, "gx:interpolate", "1")?;

    writer
        .write_event(Event::Start(BytesStart::new("gx:Track")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    // First pass: one <when>/<gx:coord> pair per sample.
    for sample in samples {
        write_element(writer, "when", &format!("{}Z", format_track_time(sample.time)))?;
        write_element(writer, "gx:coord", &coord_text(sample))?;
    }

    // Second pass: the custom arrays, positionally aligned with the
    // track points above.
    writer
        .write_event(Event::Start(BytesStart::new("ExtendedData")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    let mut schema_data = BytesStart::new("SchemaData");
    schema_data.push_attribute(("schemaUrl", "#schema"));
    writer
        .write_event(Event::Start(schema_data))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    for (name, _, value_of) in ARRAY_FIELDS {
        let mut array = BytesStart::new("gx:SimpleArrayData");
        array.push_attribute(("name", name));
        writer
            .write_event(Event::Start(array))
            .map_err(|e| ExportError::Xml(e.to_string()))?;
        for sample in samples {
            write_element(writer, "gx:value", &reading_text(value_of(sample)))?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("gx:SimpleArrayData")))
            .map_err(|e| ExportError::Xml(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("SchemaData")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("ExtendedData")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("gx:Track")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("gx:MultiTrack")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("Placemark")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(())
}

/// Coordinate string `"<lon> <lat> <alt>"`.
///
/// When both halves of the coordinate are absent the string degenerates
/// to empty; the altitude (default "0") is appended only when at least
/// one half is present.
fn coord_text(sample: &TrackSample) -> String {
    let lon_lat = format!(
        "{} {}",
        reading_text(sample.longitude),
        reading_text(sample.latitude)
    );
    let lon_lat = lon_lat.trim();
    if lon_lat.is_empty() {
        return String::new();
    }

    let altitude = sample
        .altitude
        .map(|a| a.to_string())
        .unwrap_or_else(|| "0".to_string());
    format!("{lon_lat} {altitude}")
}
