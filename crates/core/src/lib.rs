pub mod application;
pub mod countries;
pub mod domain;
pub mod error;
pub mod pattern;
pub mod ports;
pub mod ranking;
pub mod scoring;
pub mod utils;
