//! Probe engine tests
