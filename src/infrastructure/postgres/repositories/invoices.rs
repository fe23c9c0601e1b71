use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{OptionalExtension, RunQueryDsl, dsl::sum, insert_into, prelude::*, update};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{
    invoice_items::{InsertInvoiceItemEntity, InvoiceItemEntity},
    invoices::{InsertInvoiceEntity, InvoiceEntity},
};
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::value_objects::billing::{
    CreatedInvoice, NewInvoice, NewInvoiceItem, format_invoice_number,
};
use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{invoice_items, invoices},
};

// Count-then-format numbering can collide under concurrent creation; the
// unique index on invoice_number turns a collision into a retry.
const NUMBERING_ATTEMPTS: u32 = 3;

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn create_invoice(
        &self,
        invoice: NewInvoice,
        items: Vec<NewInvoiceItem>,
    ) -> Result<CreatedInvoice> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let year = Utc::now().year();

        for attempt in 1..=NUMBERING_ATTEMPTS {
            let invoice = invoice.clone();
            let items = items.clone();

            let result = conn.transaction::<CreatedInvoice, DieselError, _>(|conn| {
                let issued_this_year: i64 = invoices::table
                    .filter(invoices::invoice_number.like(format!("INV-{}-%", year)))
                    .count()
                    .get_result(conn)?;

                let invoice_number = format_invoice_number(year, issued_this_year + 1);

                let invoice_id = insert_into(invoices::table)
                    .values(&InsertInvoiceEntity {
                        user_id: invoice.user_id,
                        vehicle_id: invoice.vehicle_id,
                        invoice_number: invoice_number.clone(),
                        subtotal: invoice.subtotal,
                        tax_amount: invoice.tax_amount,
                        discount_amount: invoice.discount_amount,
                        total_amount: invoice.total_amount,
                        currency: invoice.currency,
                        status: invoice.status,
                        due_date: invoice.due_date,
                        notes: invoice.notes,
                    })
                    .returning(invoices::invoice_id)
                    .get_result::<i32>(conn)?;

                let item_rows: Vec<InsertInvoiceItemEntity> = items
                    .into_iter()
                    .map(|item| InsertInvoiceItemEntity {
                        invoice_id,
                        service_id: item.service_id,
                        history_id: item.history_id,
                        description: item.description,
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                        discount: item.discount,
                        total_price: item.total_price,
                    })
                    .collect();

                insert_into(invoice_items::table)
                    .values(&item_rows)
                    .execute(conn)?;

                Ok(CreatedInvoice {
                    invoice_id,
                    invoice_number,
                })
            });

            match result {
                Ok(created) => return Ok(created),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
                    if attempt < NUMBERING_ATTEMPTS =>
                {
                    warn!(attempt, "invoice number collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(anyhow!("invoice number generation exhausted retries"))
    }

    async fn find_owned_by_id(
        &self,
        invoice_id: i32,
        user_id: i32,
    ) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice = invoices::table
            .filter(invoices::invoice_id.eq(invoice_id))
            .filter(invoices::user_id.eq(user_id))
            .first::<InvoiceEntity>(&mut conn)
            .optional()?;

        Ok(invoice)
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = invoices::table
            .filter(invoices::user_id.eq(user_id))
            .order(invoices::issued_at.desc())
            .load::<InvoiceEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn list_items(&self, invoice_id: i32) -> Result<Vec<InvoiceItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = invoice_items::table
            .filter(invoice_items::invoice_id.eq(invoice_id))
            .order(invoice_items::item_id.asc())
            .load::<InvoiceItemEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn mark_paid(&self, invoice_id: i32) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            invoices::table
                .filter(invoices::invoice_id.eq(invoice_id))
                .filter(invoices::status.ne(InvoiceStatus::Paid.as_str())),
        )
        .set(invoices::status.eq(InvoiceStatus::Paid.as_str()))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn sum_paid_revenue(&self) -> Result<Decimal> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = invoices::table
            .filter(invoices::status.eq(InvoiceStatus::Paid.as_str()))
            .select(sum(invoices::total_amount))
            .get_result::<Option<Decimal>>(&mut conn)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
