//! Sample synchronization and timestamp synthesis.
//!
//! A ride stores its telemetry as parallel, index-aligned arrays without
//! per-sample timestamps. This module walks segment 0 of those arrays and
//! derives a timestamp for each index by spreading the ride interval
//! evenly across the sample count.

use crate::export::ExportError;
use crate::records::types::{Coordinate, Reading, Ride};
use chrono::{DateTime, Duration, Utc};

/// One positional reading across all per-sample arrays, with its
/// synthesized timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub index: usize,
    pub latitude: Option<Reading>,
    pub longitude: Option<Reading>,
    pub altitude: Option<Reading>,
    pub time: DateTime<Utc>,
    pub speed: Option<Reading>,
    pub heart_rate: Option<Reading>,
    pub cadence: Option<Reading>,
    pub power: Option<Reading>,
}

/// Lazy sequence of synchronized samples over segment 0 of a ride.
///
/// Array lengths are validated up front by [`synchronize`]; iteration
/// itself cannot fail.
#[derive(Debug)]
pub struct TrackSamples<'a> {
    coordinates: &'a [Coordinate],
    altitudes: &'a [Option<Reading>],
    speeds: &'a [Option<Reading>],
    heart_rates: &'a [Option<Reading>],
    cadences: &'a [Option<Reading>],
    powers: &'a [Option<Reading>],
    start: DateTime<Utc>,
    per_sample: Duration,
    count: usize,
    next: usize,
}

impl Iterator for TrackSamples<'_> {
    type Item = TrackSample;

    fn next(&mut self) -> Option<TrackSample> {
        if self.next >= self.count {
            return None;
        }

        let index = self.next;
        self.next += 1;

        let (latitude, longitude) = self.coordinates[index];

        // Repeated multiplication, not cumulative addition: keeps late
        // samples free of accumulated rounding drift.
        Some(TrackSample {
            index,
            latitude,
            longitude,
            altitude: self.altitudes[index],
            time: self.start + self.per_sample * index as i32,
            speed: self.speeds[index],
            heart_rate: self.heart_rates[index],
            cadence: self.cadences[index],
            power: self.powers[index],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrackSamples<'_> {}

/// Align segment 0 of a ride's per-sample arrays and synthesize one
/// timestamp per sample.
///
/// The coordinate array fixes the sample count. Every other consumed
/// array must hold at least that many segment-0 entries, otherwise the
/// whole record fails with [`ExportError::SampleArrayTooShort`]; a
/// truncated array is treated as a corrupt download rather than padded
/// (sensor dropouts arrive as nulls, not as shorter arrays).
pub fn synchronize(ride: &Ride) -> Result<TrackSamples<'_>, ExportError> {
    let coordinates = ride
        .coordinates
        .first()
        .map(Vec::as_slice)
        .unwrap_or_default();
    let count = coordinates.len();

    // Short-circuit before the interval division.
    if count == 0 {
        return Ok(TrackSamples {
            coordinates,
            altitudes: &[],
            speeds: &[],
            heart_rates: &[],
            cadences: &[],
            powers: &[],
            start: ride.start_time,
            per_sample: Duration::zero(),
            count: 0,
            next: 0,
        });
    }

    let per_sample = (ride.end_time - ride.start_time) / count as i32;

    Ok(TrackSamples {
        coordinates,
        altitudes: segment_zero("portal_altitudes", &ride.portal_altitudes, count)?,
        speeds: segment_zero("speed", &ride.speed, count)?,
        heart_rates: segment_zero("heart_rate", &ride.heart_rate, count)?,
        cadences: segment_zero("cadence", &ride.cadence, count)?,
        powers: segment_zero("power_output", &ride.power_output, count)?,
        start: ride.start_time,
        per_sample,
        count,
        next: 0,
    })
}

fn segment_zero<'a>(
    array: &'static str,
    segments: &'a [Vec<Option<Reading>>],
    expected: usize,
) -> Result<&'a [Option<Reading>], ExportError> {
    let samples = segments.first().map(Vec::as_slice).unwrap_or_default();
    if samples.len() < expected {
        return Err(ExportError::SampleArrayTooShort {
            array,
            expected,
            actual: samples.len(),
        });
    }
    Ok(samples)
}
