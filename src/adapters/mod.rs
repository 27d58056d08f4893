//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod sentiment_adapter;
pub mod trajectory_writer;
