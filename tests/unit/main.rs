//! Unit test modules.
#![recursion_limit = "256"]

mod kml_export_test;
mod record_parse_test;
mod sampler_test;
