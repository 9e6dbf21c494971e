//! Downloaded ride records: typed model and on-disk persistence.

pub mod store;
pub mod types;

pub use store::{load_ride, save_ride, RECORD_EXTENSION};
pub use types::{
    Activity, AssistanceLevelPercentage, Coordinate, Reading, RecordError, Ride, RideHeader,
};
