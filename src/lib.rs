//! Membership Upgrade - Prorated plan upgrades for a course membership platform
//!
//! Prices a move from a member's current plan to another one by crediting the
//! unused part of the current plan, then runs the checkout: invoice creation
//! with the payment gateway and applying the upgrade once payment is confirmed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
