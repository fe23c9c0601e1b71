use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{invoice_items::InvoiceItemEntity, invoices::InvoiceEntity};

/// Draft of an invoice row before the repository assigns its number.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: i32,
    pub vehicle_id: Option<i32>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Line item draft; the repository attaches the generated invoice id.
#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub service_id: Option<i32>,
    pub history_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub invoice_id: i32,
    pub invoice_number: String,
}

/// Result of the atomic webhook settlement transaction.
///
/// `journal_recorded` is false when the unique transaction-id constraint
/// suppressed a duplicate insert; `invoice_updated` is false when the invoice
/// was already paid (for example because the client confirmation won the race).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub invoice_updated: bool,
    pub journal_recorded: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceModel {
    pub vehicle_id: Option<i32>,
    pub items: Vec<CreateInvoiceItemModel>,
    pub tax_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceItemModel {
    pub service_id: Option<i32>,
    pub history_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentModel {
    pub invoice_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkInvoicePaidModel {
    pub invoice_id: i32,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummaryDto {
    pub invoice_id: i32,
    pub invoice_number: String,
    pub status: String,
    pub total_amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
}

impl From<InvoiceEntity> for InvoiceSummaryDto {
    fn from(invoice: InvoiceEntity) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            invoice_number: invoice.invoice_number,
            status: invoice.status,
            total_amount: invoice.total_amount,
            issued_at: invoice.issued_at,
            due_date: invoice.due_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItemDto {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
}

impl From<InvoiceItemEntity> for InvoiceItemDto {
    fn from(item: InvoiceItemEntity) -> Self {
        Self {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            total_price: item.total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetailDto {
    pub invoice_id: i32,
    pub invoice_number: String,
    pub vehicle_id: Option<i32>,
    pub status: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItemDto>,
}

impl InvoiceDetailDto {
    pub fn from_parts(invoice: InvoiceEntity, items: Vec<InvoiceItemEntity>) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            invoice_number: invoice.invoice_number,
            vehicle_id: invoice.vehicle_id,
            status: invoice.status,
            subtotal: invoice.subtotal,
            tax_amount: invoice.tax_amount,
            discount_amount: invoice.discount_amount,
            total_amount: invoice.total_amount,
            currency: invoice.currency,
            issued_at: invoice.issued_at,
            due_date: invoice.due_date,
            notes: invoice.notes,
            items: items.into_iter().map(InvoiceItemDto::from).collect(),
        }
    }
}

/// Converts a major-unit decimal amount to the gateway's smallest currency
/// unit. `None` when the amount does not fit an `i64` after scaling.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}

/// Converts the gateway's integer minor-unit amount back to a decimal major
/// amount for the payment journal.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Human-readable invoice number, `INV-<year>-<sequence>`.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{}-{}", year, sequence)
}
