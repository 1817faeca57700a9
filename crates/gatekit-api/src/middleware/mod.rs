//! HTTP middleware

pub mod auth;
pub mod csrf;
