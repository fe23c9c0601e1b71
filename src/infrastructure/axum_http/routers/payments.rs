use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use crate::application::usecases::payments::{PaymentGateway, PaymentUseCase};
use crate::auth::AuthUser;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::{invoices::InvoiceRepository, payments::PaymentRepository};
use crate::domain::value_objects::billing::{CreatePaymentIntentModel, MarkInvoicePaidModel};
use crate::infrastructure::axum_http::error_responses;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{invoices::InvoicePostgres, payments::PaymentPostgres},
};
use crate::payments::stripe_client::StripeClient;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
    );
    let payment_usecase = PaymentUseCase::new(
        Arc::new(invoice_repository),
        Arc::new(payment_repository),
        Arc::new(stripe_client),
        config.stripe.default_currency.clone(),
    );

    Router::new()
        .route("/intents", post(create_payment_intent))
        .route("/mark-paid", post(mark_invoice_paid))
        .route("/webhook", post(stripe_webhook))
        .with_state(Arc::new(payment_usecase))
}

pub async fn create_payment_intent<Inv, Pay, Gateway>(
    State(payment_usecase): State<Arc<PaymentUseCase<Inv, Pay, Gateway>>>,
    auth: AuthUser,
    Json(create_payment_intent_model): Json<CreatePaymentIntentModel>,
) -> impl IntoResponse
where
    Inv: InvoiceRepository + Send + Sync,
    Pay: PaymentRepository + Send + Sync,
    Gateway: PaymentGateway + Send + Sync,
{
    match payment_usecase
        .create_payment_intent(auth.user_id, create_payment_intent_model.invoice_id)
        .await
    {
        Ok(client_secret) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "client_secret": client_secret,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn mark_invoice_paid<Inv, Pay, Gateway>(
    State(payment_usecase): State<Arc<PaymentUseCase<Inv, Pay, Gateway>>>,
    auth: AuthUser,
    Json(mark_invoice_paid_model): Json<MarkInvoicePaidModel>,
) -> impl IntoResponse
where
    Inv: InvoiceRepository + Send + Sync,
    Pay: PaymentRepository + Send + Sync,
    Gateway: PaymentGateway + Send + Sync,
{
    match payment_usecase
        .confirm_payment(
            auth.user_id,
            mark_invoice_paid_model.invoice_id,
            &mark_invoice_paid_model.transaction_id,
        )
        .await
    {
        Ok(confirmation) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": confirmation.message(),
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Raw-body handler; the signature is verified over the exact bytes Stripe
/// sent, so this must not go through the Json extractor.
pub async fn stripe_webhook<Inv, Pay, Gateway>(
    State(payment_usecase): State<Arc<PaymentUseCase<Inv, Pay, Gateway>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    Inv: InvoiceRepository + Send + Sync,
    Pay: PaymentRepository + Send + Sync,
    Gateway: PaymentGateway + Send + Sync,
{
    let signature = match headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
    {
        Some(signature) => signature,
        None => return error_responses::bad_request("Missing Stripe-Signature header"),
    };

    match payment_usecase.handle_webhook(&body, signature).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => e.into_response(),
    }
}
