use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::infrastructure::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments, primary_key(payment_id))]
pub struct PaymentEntity {
    pub payment_id: i32,
    pub invoice_id: i32,
    pub payment_method: String,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub transaction_id: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub invoice_id: i32,
    pub payment_method: String,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub transaction_id: String,
    pub status: String,
    pub notes: Option<String>,
}

// NewPaymentEntity is the application-facing alias for inserting rows into `payments`.
pub type NewPaymentEntity = InsertPaymentEntity;
