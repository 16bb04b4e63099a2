//! Klarna order management core - shared types library.
//!
//! This crate provides the types shared by the order-management components:
//! - `kom` - Klarna request builder and order lifecycle coordinator
//! - `kom-cli` - Command-line adapter for running lifecycle events
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no stores.
//! Host orders are referenced by this crate, never owned: whatever system
//! persists them hands snapshots over through the store traits in `kom`.
//!
//! # Modules
//!
//! - [`types`] - IDs, countries, money, statuses, host orders and remote orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
