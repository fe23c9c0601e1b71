use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::application::usecases::invoicing::InvoiceUseCase;
use crate::auth::AuthUser;
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::value_objects::billing::CreateInvoiceModel;
use crate::infrastructure::axum_http::error_responses;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::invoices::InvoicePostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let invoice_usecase = InvoiceUseCase::new(Arc::new(invoice_repository));

    Router::new()
        .route("/", post(create_invoice))
        .route("/", get(list_invoices))
        .route("/revenue-summary", get(revenue_summary))
        .route("/:invoice_id", get(get_invoice))
        .with_state(Arc::new(invoice_usecase))
}

pub async fn create_invoice<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
    Json(create_invoice_model): Json<CreateInvoiceModel>,
) -> impl IntoResponse
where
    T: InvoiceRepository + Send + Sync,
{
    match invoice_usecase
        .create_invoice(auth.user_id, create_invoice_model)
        .await
    {
        Ok(created) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "invoice_id": created.invoice_id,
                "invoice_number": created.invoice_number,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_invoices<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    T: InvoiceRepository + Send + Sync,
{
    match invoice_usecase.list_invoices(auth.user_id).await {
        Ok(invoices) => (StatusCode::OK, Json(invoices)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_invoice<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
    Path(invoice_id): Path<i32>,
) -> impl IntoResponse
where
    T: InvoiceRepository + Send + Sync,
{
    match invoice_usecase.get_invoice(auth.user_id, invoice_id).await {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn revenue_summary<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    T: InvoiceRepository + Send + Sync,
{
    if !auth.is_admin() {
        return error_responses::forbidden("Admin access required");
    }

    match invoice_usecase.revenue_summary().await {
        Ok(total) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "total_revenue": total,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
