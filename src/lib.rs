//! Off-hours ticket routing engine: classify incoming customer tickets,
//! resolve their address, and assign them to an available manager.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod geocoder;
pub mod pipeline;
pub mod policy;

pub use config::Config;
pub use error::RouterError;
pub use pipeline::{ProcessingResult, TicketPipeline};
