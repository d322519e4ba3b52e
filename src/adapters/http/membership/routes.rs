//! Axum router configuration for membership upgrade endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_transaction, handle_xendit_webhook, initiate_upgrade, list_upgrade_options,
    quote_upgrade, MembershipAppState,
};

/// Member-facing routes, mounted at `/api/membership`.
///
/// # Routes (require `X-User-Id`)
/// - `GET /upgrade/options` - Upgrade options with prices
/// - `GET /upgrade/quote?target_plan_id=` - Price of one upgrade
/// - `POST /upgrade` - Start an upgrade checkout
/// - `GET /transactions/:id` - Checkout status
pub fn membership_routes() -> Router<MembershipAppState> {
    Router::new()
        .route("/upgrade/options", get(list_upgrade_options))
        .route("/upgrade/quote", get(quote_upgrade))
        .route("/upgrade", post(initiate_upgrade))
        .route("/transactions/:id", get(get_transaction))
}

/// Payment gateway callbacks, mounted at `/api/webhooks`.
///
/// Separate from the member routes because callbacks carry no user identity
/// (they're verified via the callback token).
pub fn webhook_routes() -> Router<MembershipAppState> {
    Router::new().route("/xendit", post(handle_xendit_webhook))
}

/// Both routers, suitable for nesting under `/api`.
pub fn membership_router() -> Router<MembershipAppState> {
    Router::new()
        .nest("/membership", membership_routes())
        .nest("/webhooks", webhook_routes())
}
