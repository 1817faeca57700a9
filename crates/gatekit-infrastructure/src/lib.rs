//! # Gatekit Infrastructure
//!
//! Backend implementations for the core ports: PostgreSQL for production,
//! in-memory for tests and local development.

pub mod database;
