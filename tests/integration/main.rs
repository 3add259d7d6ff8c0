//! Integration tests for the TutorLink presence core.

mod helpers;

mod lifecycle_test;
mod throttle_test;
