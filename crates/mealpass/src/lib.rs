//! Canteen administration platform library.
//!
//! The interesting piece is [`canteen::verification`]: a deterministic meal
//! eligibility engine with its rule catalogue and HTTP surface. `config`,
//! `telemetry`, and `error` carry the service plumbing around it.

pub mod canteen;
pub mod config;
pub mod error;
pub mod telemetry;
