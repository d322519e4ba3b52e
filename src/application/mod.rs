//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates domain operations across ports. Command handlers change
//! state; query handlers only read.

pub mod handlers;
