//! Unit tests for parsing ride records from raw portal payloads.

use rideport::records::{Activity, Reading, Ride};
use serde_json::json;

use crate::fixtures::sample_ride;

/// A detail payload in the exact wire shape the portal delivers.
fn ride_payload() -> serde_json::Value {
    json!({
        "id": 900123,
        "start_time": 1672531200000_i64,
        "end_time": 1672531260000_i64,
        "driving_time": 60,
        "type": "BIKE_RIDE",
        "status": 1,
        "total_distance": 412.0,
        "title": "Morning loop",
        "operation_time": 3600,
        "header_type": "RIDE",
        "calories": 18.0,
        "avg_speed": 24.7,
        "avg_heart_rate": 121.0,
        "avg_cadence": 74.0,
        "avg_altitude": 15.0,
        "max_speed": 31.2,
        "max_heart_rate": 141,
        "max_cadence": 92,
        "max_altitude": 20.0,
        "cadence": [[null, 75]],
        "heart_rate": [[null, null]],
        "speed": [[12.5, null]],
        "coordinates": [[[1.0, 2.0], [null, null]]],
        "portal_altitudes": [[10, 20]],
        "training_effect": 0,
        "training_load_peak": 0,
        "speed_weight": 100,
        "cadence_weight": 100,
        "driver_power_weight": 100,
        "significant": 1,
        "elevation_gain": 12.0,
        "elevation_loss": 9.0,
        "total_driver_power": 54,
        "total_driver_consumption_percentage": 40.0,
        "total_battery_consumption_percentage": 3.0,
        "bui_decoded_serial_number": 4711,
        "bui_decoded_part_number": "BUI330",
        "drive_unit_decoded_serial_number": "0815",
        "drive_unit_decoded_part_number": "DU450",
        "average_driver_power": 87.5,
        "power_output": [[54, null]],
        "significant_assistance_level_percentages": [{"level": 2, "value": 0.8}],
        "drive_unit_serial": "DU-0815",
    })
}

#[test]
fn wire_payload_parses_into_typed_fields() {
    let ride = Ride::from_value(ride_payload()).unwrap();

    assert_eq!(ride.id, "900123");
    assert_eq!(ride.title, "Morning loop");
    assert_eq!(ride.driving_time.num_seconds(), 60);
    assert_eq!((ride.end_time - ride.start_time).num_seconds(), 60);
    assert_eq!(ride.operation_time, "3600");
    assert_eq!(ride.bui_decoded_serial_number, "4711");

    assert_eq!(ride.speed[0][0], Some(Reading::Float(12.5)));
    assert_eq!(ride.speed[0][1], None);
    assert_eq!(ride.cadence[0][1], Some(Reading::Int(75)));
    assert_eq!(
        ride.coordinates[0][0],
        (Some(Reading::Float(1.0)), Some(Reading::Float(2.0)))
    );
    assert_eq!(ride.coordinates[0][1], (None, None));
    assert_eq!(ride.significant_assistance_level_percentages[0].level, 2);
}

#[test]
fn round_trip_preserves_times_and_spans_exactly() {
    let ride = Ride::from_value(ride_payload()).unwrap();

    let encoded = serde_json::to_value(&ride).unwrap();
    assert_eq!(encoded["start_time"], json!(1672531200000_i64));
    assert_eq!(encoded["end_time"], json!(1672531260000_i64));
    assert_eq!(encoded["driving_time"], json!(60));

    let reparsed = Ride::from_value(encoded).unwrap();
    assert_eq!(reparsed, ride);
}

#[test]
fn struct_round_trip_matches_field_for_field() {
    let ride = sample_ride();
    let reparsed = Ride::from_value(serde_json::to_value(&ride).unwrap()).unwrap();
    assert_eq!(reparsed, ride);
}

#[test]
fn missing_required_field_fails_the_parse() {
    let mut payload = ride_payload();
    payload.as_object_mut().unwrap().remove("coordinates");

    assert!(Ride::from_value(payload).is_err());
}

#[test]
fn untypeable_field_fails_the_parse() {
    let mut payload = ride_payload();
    payload["start_time"] = json!("yesterday");

    assert!(Ride::from_value(payload).is_err());
}

#[test]
fn listing_payload_parses_with_nested_headers() {
    let payload = json!([{
        "id": "act-1",
        "start_time": 1678435200000_i64,
        "end_time": 1678442400000_i64,
        "driving_time": 7200,
        "type": "BIKE_RIDE",
        "status": 1,
        "total_distance": 2000.0,
        "header_rides_ids": ["r1"],
        "ride_headers": [{
            "id": "r1",
            "start_time": 1678435200000_i64,
            "end_time": 1678438800000_i64,
            "driving_time": 3600,
            "type": "BIKE_RIDE",
            "status": 1,
            "total_distance": 1000.0,
            "title": "ride one",
            "calories": 100.0,
            "avg_speed": 20.0,
            "max_speed": 30.0,
            "header_rides_ids": [],
        }],
    }]);

    let activities: Vec<Activity> = serde_json::from_value(payload).unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].ride_headers[0].id, "r1");
    assert_eq!(activities[0].ride_headers[0].title, "ride one");
}
