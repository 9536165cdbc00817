//! Parcel tracking API server library.
//!
//! This crate primarily ships a `parcel-server` binary, but we expose a small
//! library surface to enable integration testing against alternative stores.

pub mod api;
pub mod config;
pub mod db;
pub mod parcel;
pub mod state;
