//! diskmirror Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FileSnapshot`, `Action`, `Plan`, `Outcome`
//! - **Port definitions** - The `IRemoteStore` trait that storage adapters implement
//! - **Configuration** - The immutable `Config` value loaded once at startup
//!
//! # Architecture
//!
//! The domain module is pure: it knows nothing about HTTP, the local
//! filesystem, or timers. Ports define the trait interfaces that adapter
//! crates implement, and the sync crate drives both.

pub mod config;
pub mod domain;
pub mod ports;
