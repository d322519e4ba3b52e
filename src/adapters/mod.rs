//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process stores (tests, local development)
//! - `postgres` - sqlx-backed stores
//! - `xendit` - Payment gateway over the Xendit invoice API
//! - `http` - Axum REST surface

pub mod http;
pub mod memory;
pub mod postgres;
pub mod xendit;
