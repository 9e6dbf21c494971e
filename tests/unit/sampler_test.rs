//! Unit tests for sample synchronization and timestamp synthesis.

use chrono::{TimeZone, Utc};
use rideport::export::{synchronize, ExportError, TrackSample};
use rideport::records::Reading;

use crate::fixtures::sample_ride;

#[test]
fn two_samples_split_a_minute_at_the_half() {
    let ride = sample_ride();

    let samples: Vec<TrackSample> = synchronize(&ride).unwrap().collect();

    assert_eq!(samples.len(), 2);
    assert_eq!(
        samples[0].time,
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        samples[1].time,
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 30).unwrap()
    );

    for sample in &samples {
        assert_eq!(sample.speed, None);
        assert_eq!(sample.heart_rate, None);
        assert_eq!(sample.cadence, None);
        assert_eq!(sample.power, None);
    }
}

#[test]
fn first_sample_starts_at_ride_start_and_last_stays_before_end() {
    let mut ride = sample_ride();
    let n = 7;
    ride.coordinates = vec![vec![(Some(Reading::Float(1.0)), Some(Reading::Float(2.0))); n]];
    ride.portal_altitudes = vec![vec![None; n]];
    ride.speed = vec![vec![None; n]];
    ride.heart_rate = vec![vec![None; n]];
    ride.cadence = vec![vec![None; n]];
    ride.power_output = vec![vec![None; n]];

    let samples: Vec<TrackSample> = synchronize(&ride).unwrap().collect();
    let per_sample = (ride.end_time - ride.start_time) / n as i32;

    assert_eq!(samples.len(), n);
    assert_eq!(samples[0].time, ride.start_time);
    assert!(samples[n - 1].time < ride.end_time);
    assert!(ride.end_time - samples[n - 1].time <= per_sample);
}

#[test]
fn zero_samples_produce_an_empty_sequence_without_a_division() {
    let mut ride = sample_ride();
    ride.coordinates = vec![vec![]];
    ride.portal_altitudes = vec![vec![]];
    ride.speed = vec![vec![]];
    ride.heart_rate = vec![vec![]];
    ride.cadence = vec![vec![]];
    ride.power_output = vec![vec![]];

    assert_eq!(synchronize(&ride).unwrap().count(), 0);
}

#[test]
fn shorter_sensor_array_fails_the_whole_record() {
    let mut ride = sample_ride();
    ride.power_output = vec![vec![None]];

    assert!(matches!(
        synchronize(&ride),
        Err(ExportError::SampleArrayTooShort {
            array: "power_output",
            expected: 2,
            actual: 1,
        })
    ));
}
