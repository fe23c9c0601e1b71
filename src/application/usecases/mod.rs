pub mod invoicing;
pub mod payments;

use axum::http::StatusCode;
use thiserror::Error;

/// Error surface shared by the billing use cases.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("invoice not found")]
    InvoiceNotFound,

    #[error("invoice is not payable: {0}")]
    NotPayable(String),

    #[error("{0}")]
    Validation(String),

    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),

    #[error("payment gateway request failed")]
    Gateway(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BillingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::InvoiceNotFound => StatusCode::NOT_FOUND,
            BillingError::NotPayable(_)
            | BillingError::Validation(_)
            | BillingError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            BillingError::Gateway(_) | BillingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BillingError>;
