use anyhow::Result;
use async_trait::async_trait;
use diesel::result::Error as DieselError;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::domain::entities::payments::{NewPaymentEntity, PaymentEntity};
use crate::domain::repositories::payments::PaymentRepository;
use crate::domain::value_objects::billing::SettlementOutcome;
use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{invoices, payments},
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::transaction_id.eq(transaction_id))
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn settle_invoice(&self, payment: NewPaymentEntity) -> Result<SettlementOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The invoice update and journal insert commit or roll back together,
        // so the ledger can never show paid with no journal row (or vice
        // versa) after a crash mid-settlement.
        let outcome = conn.transaction::<SettlementOutcome, DieselError, _>(|conn| {
            let invoice_updated = update(
                invoices::table
                    .filter(invoices::invoice_id.eq(payment.invoice_id))
                    .filter(invoices::status.ne(InvoiceStatus::Paid.as_str())),
            )
            .set(invoices::status.eq(InvoiceStatus::Paid.as_str()))
            .execute(conn)?
                > 0;

            let journal_recorded = insert_into(payments::table)
                .values(&payment)
                .on_conflict(payments::transaction_id)
                .do_nothing()
                .execute(conn)?
                > 0;

            Ok(SettlementOutcome {
                invoice_updated,
                journal_recorded,
            })
        })?;

        Ok(outcome)
    }
}
