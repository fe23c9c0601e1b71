use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::infrastructure::postgres::schema::invoices;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices, primary_key(invoice_id))]
pub struct InvoiceEntity {
    pub invoice_id: i32,
    pub user_id: i32,
    pub vehicle_id: Option<i32>,
    pub invoice_number: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub user_id: i32,
    pub vehicle_id: Option<i32>,
    pub invoice_number: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
