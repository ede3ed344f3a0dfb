//! zonegate API server library crate.
//!
//! # Purpose
//! Exposes the token-gated DNS API (handlers, call authorizer, configuration,
//! and the zone backend boundary) for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod observability;
pub mod store;
