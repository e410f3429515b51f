//! Core types: configuration, errors and path helpers.

pub mod config;
pub mod errors;
pub mod paths;
