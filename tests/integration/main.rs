//! Integration test modules.
#![recursion_limit = "256"]
