use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;

use crate::domain::entities::{invoice_items::InvoiceItemEntity, invoices::InvoiceEntity};
use crate::domain::value_objects::billing::{CreatedInvoice, NewInvoice, NewInvoiceItem};

#[async_trait]
#[automock]
pub trait InvoiceRepository {
    /// Inserts an invoice with its line items, assigning the invoice number.
    async fn create_invoice(
        &self,
        invoice: NewInvoice,
        items: Vec<NewInvoiceItem>,
    ) -> Result<CreatedInvoice>;

    /// Ownership-scoped fetch; `None` when the invoice does not exist or
    /// belongs to another user.
    async fn find_owned_by_id(&self, invoice_id: i32, user_id: i32)
    -> Result<Option<InvoiceEntity>>;

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<InvoiceEntity>>;

    async fn list_items(&self, invoice_id: i32) -> Result<Vec<InvoiceItemEntity>>;

    /// Conditionally flips the invoice to paid (`WHERE status != 'paid'`) in a
    /// single statement. Returns whether a row actually changed.
    async fn mark_paid(&self, invoice_id: i32) -> Result<bool>;

    async fn sum_paid_revenue(&self) -> Result<Decimal>;
}
