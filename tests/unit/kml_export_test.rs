//! Unit tests for the KML exporter.

use rideport::export::{export_kml, synchronize, TrackSample};
use rideport::records::{Reading, Ride};

use crate::fixtures::sample_ride;

fn render(ride: &Ride) -> String {
    let samples: Vec<TrackSample> = synchronize(ride).unwrap().collect();
    export_kml(ride, &samples).unwrap()
}

#[test]
fn whens_are_thirty_seconds_apart_with_the_literal_z_suffix() {
    let xml = render(&sample_ride());

    assert!(xml.contains("<when>2023-01-01T00:00:00Z</when>"));
    assert!(xml.contains("<when>2023-01-01T00:00:30Z</when>"));
}

#[test]
fn coordinates_render_as_lon_lat_alt() {
    let xml = render(&sample_ride());

    assert!(xml.contains("<gx:coord>2.0 1.0 10</gx:coord>"));
    assert!(xml.contains("<gx:coord>2.1 1.1 20</gx:coord>"));
}

#[test]
fn placemark_carries_the_ride_id_and_activity_type() {
    let xml = render(&sample_ride());

    assert!(xml.contains("<opentracks:trackid>900123</opentracks:trackid>"));
    assert!(xml.contains("<value>cyclism</value>"));
    assert!(xml.contains("<icon>BIKE</icon>"));
    assert!(xml.contains("<styleUrl>#track</styleUrl>"));
}

#[test]
fn schema_declares_the_four_float_arrays() {
    let xml = render(&sample_ride());

    for name in ["speed", "power", "cadence", "heart_rate"] {
        assert!(
            xml.contains(&format!("<gx:SimpleArrayField name=\"{name}\" type=\"float\">")),
            "schema misses {name}"
        );
        assert!(xml.contains(&format!("<gx:SimpleArrayData name=\"{name}\">")));
    }
}

#[test]
fn absent_readings_render_as_empty_values_never_zero() {
    let xml = render(&sample_ride());

    // Two samples, four arrays, all readings absent.
    assert_eq!(xml.matches("<gx:value></gx:value>").count(), 8);
    assert!(!xml.contains("<gx:value>0</gx:value>"));
}

#[test]
fn coordinate_without_lat_and_lon_degenerates_to_empty() {
    let mut ride = sample_ride();
    ride.coordinates = vec![vec![(None, None), (None, None)]];

    let xml = render(&ride);
    assert_eq!(xml.matches("<gx:coord></gx:coord>").count(), 2);
}

#[test]
fn missing_altitude_defaults_to_zero_in_the_coordinate_string() {
    let mut ride = sample_ride();
    ride.portal_altitudes = vec![vec![None, None]];

    let xml = render(&ride);
    assert!(xml.contains("<gx:coord>2.0 1.0 0</gx:coord>"));
    assert!(xml.contains("<gx:coord>2.1 1.1 0</gx:coord>"));
}

#[test]
fn export_is_byte_identical_across_runs() {
    let ride = sample_ride();
    let samples: Vec<TrackSample> = synchronize(&ride).unwrap().collect();

    assert_eq!(
        export_kml(&ride, &samples).unwrap(),
        export_kml(&ride, &samples).unwrap()
    );
}

#[test]
fn array_values_follow_the_sample_order() {
    let mut ride = sample_ride();
    ride.cadence = vec![vec![Some(Reading::Int(70)), Some(Reading::Int(80))]];

    let xml = render(&ride);
    let cadence_block = xml
        .split("<gx:SimpleArrayData name=\"cadence\">")
        .nth(1)
        .unwrap()
        .split("</gx:SimpleArrayData>")
        .next()
        .unwrap();

    let seventy = cadence_block.find("<gx:value>70</gx:value>").unwrap();
    let eighty = cadence_block.find("<gx:value>80</gx:value>").unwrap();
    assert!(seventy < eighty);
}
