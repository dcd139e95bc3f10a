//! Stryde Engine Library
//!
//! This library provides the widget package subsystem of the Stryde host
//! application: discovering packages in a remote catalog, verifying them,
//! installing them durably, and merging their widget definitions into the
//! registry the UI reads from.

/// Remote catalog access module
pub mod catalog;

/// Configuration management module
pub mod config;

/// Marketplace orchestration module
pub mod marketplace;

/// Widget definition registry module
pub mod registry;

/// Durable package storage module
pub mod store;

/// Telemetry and Observability
pub mod telemetry;

/// Package verification module
pub mod verifier;
