//! Transport for the JobServe jobs API.

pub mod client;
pub mod types;
pub mod xml;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{JobServeApi, JobServeClient};
