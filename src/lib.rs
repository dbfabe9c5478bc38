//! Client for the JobServe jobs API.
//!
//! Reference data (countries, currencies, salary bands and so on) changes
//! rarely, so the [`services`] fetch each collection once and answer every
//! later lookup from memory. The caching layer itself lives in [`cache`] and
//! knows nothing about JobServe.

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod services;
