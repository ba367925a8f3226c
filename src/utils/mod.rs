//! Utility functions and helpers for the fitnode-rs library.

pub mod finite_difference;
