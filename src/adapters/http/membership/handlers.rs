//! HTTP handlers for membership upgrade endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::xendit::XenditInvoiceCallback;
use crate::application::handlers::membership::{
    ConfirmUpgradePaymentCommand, ConfirmUpgradePaymentHandler, GetTransactionStatusHandler,
    GetTransactionStatusQuery, InitiateUpgradeCommand, InitiateUpgradeHandler,
    ListUpgradeOptionsHandler, ListUpgradeOptionsQuery, QuoteUpgradeHandler, QuoteUpgradeQuery,
};
use crate::domain::foundation::{DomainError, TransactionId, UserId};
use crate::domain::membership::MembershipError;
use crate::ports::{
    MembershipReader, MembershipRepository, PaymentCallback, PaymentGateway, PlanCatalog,
    TransactionRepository,
};

use super::dto::{
    ErrorResponse, InitiateUpgradeRequest, InitiateUpgradeResponse, QuoteUpgradeParams,
    TransactionResponse, UpgradeOptionsResponse, UpgradeQuoteResponse, WebhookAckResponse,
};

/// Header carrying the Xendit callback verification token.
pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are built on demand from the
/// Arc-wrapped ports.
#[derive(Clone)]
pub struct MembershipAppState {
    pub plan_catalog: Arc<dyn PlanCatalog>,
    pub membership_reader: Arc<dyn MembershipReader>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub transaction_repository: Arc<dyn TransactionRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
}

impl MembershipAppState {
    pub fn quote_handler(&self) -> QuoteUpgradeHandler {
        QuoteUpgradeHandler::new(self.membership_reader.clone(), self.plan_catalog.clone())
    }

    pub fn options_handler(&self) -> ListUpgradeOptionsHandler {
        ListUpgradeOptionsHandler::new(self.quote_handler(), self.plan_catalog.clone())
    }

    pub fn initiate_handler(&self) -> InitiateUpgradeHandler {
        InitiateUpgradeHandler::new(
            self.quote_handler(),
            self.membership_repository.clone(),
            self.transaction_repository.clone(),
            self.payment_gateway.clone(),
        )
    }

    pub fn confirm_handler(&self) -> ConfirmUpgradePaymentHandler {
        ConfirmUpgradePaymentHandler::new(
            self.payment_gateway.clone(),
            self.transaction_repository.clone(),
            self.membership_repository.clone(),
            self.plan_catalog.clone(),
        )
    }

    pub fn transaction_status_handler(&self) -> GetTransactionStatusHandler {
        GetTransactionStatusHandler::new(self.transaction_repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity, taken from the `X-User-Id` header set by the session layer
/// in front of this service.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/membership/upgrade/options - Every plan the caller can move to
pub async fn list_upgrade_options(
    State(state): State<MembershipAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, MembershipApiError> {
    let handler = state.options_handler();
    let query = ListUpgradeOptionsQuery {
        user_id: user.user_id,
    };

    let result = handler.handle(query).await?;

    Ok(Json(UpgradeOptionsResponse::from(result)))
}

/// GET /api/membership/upgrade/quote?target_plan_id= - Price of one upgrade
pub async fn quote_upgrade(
    State(state): State<MembershipAppState>,
    user: AuthenticatedUser,
    Query(params): Query<QuoteUpgradeParams>,
) -> Result<impl IntoResponse, MembershipApiError> {
    let handler = state.quote_handler();
    let query = QuoteUpgradeQuery {
        user_id: user.user_id,
        target_plan_id: params.target_plan_id,
    };

    let quote = handler.handle(query).await?;

    Ok(Json(UpgradeQuoteResponse::from(quote)))
}

/// GET /api/membership/transactions/:id - Poll an upgrade checkout
pub async fn get_transaction(
    State(state): State<MembershipAppState>,
    user: AuthenticatedUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<impl IntoResponse, MembershipApiError> {
    let handler = state.transaction_status_handler();
    let query = GetTransactionStatusQuery {
        user_id: user.user_id,
        transaction_id,
    };

    let transaction = handler.handle(query).await?;

    Ok(Json(TransactionResponse::from(transaction)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/membership/upgrade - Start an upgrade checkout
///
/// Responds `201 Created` with an invoice URL, or `200 OK` when the upgrade
/// cost nothing and was applied on the spot.
pub async fn initiate_upgrade(
    State(state): State<MembershipAppState>,
    user: AuthenticatedUser,
    Json(request): Json<InitiateUpgradeRequest>,
) -> Result<impl IntoResponse, MembershipApiError> {
    let handler = state.initiate_handler();
    let cmd = InitiateUpgradeCommand {
        user_id: user.user_id,
        target_plan_id: request.target_plan_id,
        payer_email: request.payer_email,
    };

    let result = handler.handle(cmd).await?;

    let status = if result.invoice_url.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(InitiateUpgradeResponse::from(result))))
}

/// POST /api/webhooks/xendit - Invoice status callback
///
/// Not user-authenticated; the `x-callback-token` header is checked by the
/// command handler before anything is read from storage.
pub async fn handle_xendit_webhook(
    State(state): State<MembershipAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, MembershipApiError> {
    let callback_token = headers
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(MembershipError::InvalidCallbackToken)?;

    let payload: XenditInvoiceCallback = serde_json::from_slice(&body)
        .map_err(|e| MembershipError::validation("body", e.to_string()))?;
    let callback = PaymentCallback::try_from(payload)
        .map_err(|e| MembershipError::validation("status", e.to_string()))?;

    let handler = state.confirm_handler();
    let cmd = ConfirmUpgradePaymentCommand {
        callback_token: callback_token.to_string(),
        callback,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(WebhookAckResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct MembershipApiError(MembershipError);

impl From<MembershipError> for MembershipApiError {
    fn from(err: MembershipError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for MembershipApiError {
    fn from(err: DomainError) -> Self {
        Self(MembershipError::from(err))
    }
}

impl MembershipApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            MembershipError::NotFoundForUser(_)
            | MembershipError::PlanNotFound(_)
            | MembershipError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            MembershipError::AlreadyLifetime => StatusCode::CONFLICT,
            MembershipError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            MembershipError::InvalidState { .. } => StatusCode::CONFLICT,
            MembershipError::PaymentFailed { .. } => StatusCode::BAD_GATEWAY,
            MembershipError::InvalidCallbackToken => StatusCode::UNAUTHORIZED,
            MembershipError::Forbidden => StatusCode::FORBIDDEN,
            MembershipError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            MembershipError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MembershipApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = if let MembershipError::Infrastructure(detail) = &self.0 {
            tracing::error!(error = %detail, "Upgrade request failed");
            "An internal error occurred".to_string()
        } else {
            self.0.message()
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PlanId;

    fn status_of(err: MembershipError) -> StatusCode {
        MembershipApiError(err).into_response().status()
    }

    #[test]
    fn already_lifetime_maps_to_409() {
        assert_eq!(status_of(MembershipError::AlreadyLifetime), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_target_maps_to_400() {
        assert_eq!(
            status_of(MembershipError::invalid_target("same plan")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(
            status_of(MembershipError::plan_not_found(PlanId::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(MembershipError::not_found_for_user(UserId::new("u").unwrap())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(MembershipError::transaction_not_found(TransactionId::new())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn bad_callback_token_maps_to_401() {
        assert_eq!(
            status_of(MembershipError::InvalidCallbackToken),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn infrastructure_maps_to_500() {
        assert_eq!(
            status_of(MembershipError::infrastructure("pool closed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(status_of(MembershipError::Forbidden), StatusCode::FORBIDDEN);
    }
}
