pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod feed;
pub mod filter;
pub mod grid;
pub mod map;
pub mod metrics;
pub mod report;
pub mod seed;
pub mod store;
pub mod telemetry;
pub mod views;

pub use error::{Error, Result};
