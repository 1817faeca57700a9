//! Database adapters

pub mod connection;
pub mod memory;
pub mod postgres;
