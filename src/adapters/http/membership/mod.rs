//! HTTP adapter for membership upgrade endpoints.
//!
//! Exposes the upgrade flow via REST API:
//! - `GET /api/membership/upgrade/options` - List upgrade options
//! - `GET /api/membership/upgrade/quote` - Quote one upgrade
//! - `POST /api/membership/upgrade` - Start an upgrade checkout
//! - `GET /api/membership/transactions/:id` - Poll a checkout
//! - `POST /api/webhooks/xendit` - Handle Xendit invoice callbacks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{MembershipApiError, MembershipAppState, CALLBACK_TOKEN_HEADER};
pub use routes::{membership_router, membership_routes, webhook_routes};
