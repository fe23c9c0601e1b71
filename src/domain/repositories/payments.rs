use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payments::{NewPaymentEntity, PaymentEntity};
use crate::domain::value_objects::billing::SettlementOutcome;

#[async_trait]
#[automock]
pub trait PaymentRepository {
    /// Journal lookup by the gateway's transaction id (idempotency key).
    async fn find_by_transaction_id(&self, transaction_id: &str)
    -> Result<Option<PaymentEntity>>;

    /// Applies one settlement atomically: the conditional invoice update and
    /// the journal insert run in the same database transaction, with the
    /// unique transaction-id constraint suppressing duplicate journal rows.
    async fn settle_invoice(&self, payment: NewPaymentEntity) -> Result<SettlementOutcome>;
}
