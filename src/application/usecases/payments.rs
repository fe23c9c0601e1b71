use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::application::usecases::{BillingError, UseCaseResult};
use crate::domain::entities::payments::NewPaymentEntity;
use crate::domain::repositories::{invoices::InvoiceRepository, payments::PaymentRepository};
use crate::domain::value_objects::{
    billing::{from_minor_units, to_minor_units},
    enums::{invoice_statuses::InvoiceStatus, payment_statuses::PaymentStatus},
};
use crate::payments::stripe_client::{CreatedPaymentIntent, StripeClient, StripeEvent};

/// Journal rows created from webhook settlements carry this method marker.
const GATEWAY_PAYMENT_METHOD: &str = "stripe";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<CreatedPaymentIntent>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<CreatedPaymentIntent> {
        self.create_payment_intent(amount_minor, currency, metadata)
            .await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

/// Outcome of the client-confirmation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentConfirmation {
    MarkedPaid,
    AlreadyPaid,
}

impl PaymentConfirmation {
    pub fn message(&self) -> &'static str {
        match self {
            PaymentConfirmation::MarkedPaid => "Invoice marked as paid",
            PaymentConfirmation::AlreadyPaid => "Invoice already marked as paid",
        }
    }
}

pub struct PaymentUseCase<Inv, Pay, Gateway>
where
    Inv: InvoiceRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: PaymentGateway + Send + Sync + 'static,
{
    invoice_repo: Arc<Inv>,
    payment_repo: Arc<Pay>,
    gateway: Arc<Gateway>,
    default_currency: String,
}

impl<Inv, Pay, Gateway> PaymentUseCase<Inv, Pay, Gateway>
where
    Inv: InvoiceRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        invoice_repo: Arc<Inv>,
        payment_repo: Arc<Pay>,
        gateway: Arc<Gateway>,
        default_currency: String,
    ) -> Self {
        Self {
            invoice_repo,
            payment_repo,
            gateway,
            default_currency,
        }
    }

    /// Creates a gateway payment intent for an invoice the caller owns and
    /// returns the client secret for out-of-band confirmation.
    pub async fn create_payment_intent(
        &self,
        user_id: i32,
        invoice_id: i32,
    ) -> UseCaseResult<String> {
        info!(%user_id, %invoice_id, "payments: payment intent requested");

        let invoice = self
            .invoice_repo
            .find_owned_by_id(invoice_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, %invoice_id, db_error = ?err, "payments: failed to load invoice");
                BillingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BillingError::InvoiceNotFound;
                warn!(
                    %user_id,
                    %invoice_id,
                    status = err.status_code().as_u16(),
                    "payments: invoice missing or not owned by caller"
                );
                err
            })?;

        let payable = InvoiceStatus::from_str(&invoice.status)
            .map(|status| status.is_payable())
            .unwrap_or(false);
        if !payable {
            let err = BillingError::NotPayable(format!("invoice status is {}", invoice.status));
            warn!(
                %user_id,
                %invoice_id,
                invoice_status = %invoice.status,
                status = err.status_code().as_u16(),
                "payments: invoice is not payable"
            );
            return Err(err);
        }

        let amount_minor = to_minor_units(invoice.total_amount).ok_or_else(|| {
            BillingError::Internal(anyhow::anyhow!(
                "invoice total {} cannot be converted to minor units",
                invoice.total_amount
            ))
        })?;
        let currency = invoice
            .currency
            .clone()
            .unwrap_or_else(|| self.default_currency.clone());

        let metadata = HashMap::from([
            ("invoice_id".to_string(), invoice_id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
        ]);

        info!(
            %user_id,
            %invoice_id,
            amount_minor,
            currency = %currency,
            "payments: creating payment intent"
        );

        let intent = self
            .gateway
            .create_payment_intent(amount_minor, &currency, metadata)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %invoice_id,
                    error = ?err,
                    "payments: gateway payment intent creation failed"
                );
                BillingError::Gateway(err)
            })?;

        info!(
            %user_id,
            %invoice_id,
            transaction_id = %intent.id,
            "payments: payment intent created"
        );

        Ok(intent.client_secret)
    }

    /// Single-shot webhook handler. Verification failures surface as 400 with
    /// no side effects; storage failures surface as 500 so the gateway
    /// redelivers, with the journal's unique transaction id guarding against
    /// duplicate effects.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> UseCaseResult<()> {
        let event = self
            .gateway
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "payments: webhook signature verification failed");
                BillingError::InvalidWebhook("signature verification failed".to_string())
            })?;

        info!(event_type = %event.type_, "payments: webhook verified");

        match event.type_.as_str() {
            "payment_intent.succeeded" => self.handle_intent_succeeded(&event).await,
            "payment_intent.payment_failed" => self.handle_intent_failed(&event),
            _ => {
                debug!(event_type = %event.type_, "payments: unhandled webhook event type");
                Ok(())
            }
        }
    }

    async fn handle_intent_succeeded(&self, event: &StripeEvent) -> UseCaseResult<()> {
        let intent = StripeClient::extract_payment_intent(event).ok_or_else(|| {
            let err = BillingError::InvalidWebhook("missing payment intent object".to_string());
            warn!(
                status = err.status_code().as_u16(),
                "payments: succeeded event without payment intent object"
            );
            err
        })?;

        let invoice_id = intent
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get("invoice_id"))
            .and_then(|value| value.parse::<i32>().ok());

        let Some(invoice_id) = invoice_id else {
            // Upstream data anomaly, not a retryable fault: acknowledge so the
            // gateway stops redelivering, but make the dropped settlement loud.
            error!(
                transaction_id = %intent.id,
                "payments: succeeded event has no invoice_id metadata, settlement dropped"
            );
            return Ok(());
        };

        if let Some(existing) = self
            .payment_repo
            .find_by_transaction_id(&intent.id)
            .await
            .map_err(|err| {
                error!(
                    %invoice_id,
                    transaction_id = %intent.id,
                    db_error = ?err,
                    "payments: journal lookup failed"
                );
                BillingError::Internal(err)
            })?
        {
            if existing.status == PaymentStatus::Completed.as_str() {
                info!(
                    %invoice_id,
                    transaction_id = %intent.id,
                    "payments: duplicate webhook delivery, already journaled"
                );
                return Ok(());
            }
        }

        let amount_minor = intent.amount_received.ok_or_else(|| {
            let err = BillingError::InvalidWebhook("missing amount_received".to_string());
            warn!(
                %invoice_id,
                transaction_id = %intent.id,
                status = err.status_code().as_u16(),
                "payments: succeeded event without amount_received"
            );
            err
        })?;

        let outcome = self
            .payment_repo
            .settle_invoice(NewPaymentEntity {
                invoice_id,
                payment_method: GATEWAY_PAYMENT_METHOD.to_string(),
                amount: from_minor_units(amount_minor),
                paid_at: Utc::now(),
                transaction_id: intent.id.clone(),
                status: PaymentStatus::Completed.to_string(),
                notes: None,
            })
            .await
            .map_err(|err| {
                error!(
                    %invoice_id,
                    transaction_id = %intent.id,
                    db_error = ?err,
                    "payments: settlement transaction failed, expecting redelivery"
                );
                BillingError::Internal(err)
            })?;

        info!(
            %invoice_id,
            transaction_id = %intent.id,
            amount_minor,
            invoice_updated = outcome.invoice_updated,
            journal_recorded = outcome.journal_recorded,
            "payments: settlement applied"
        );

        Ok(())
    }

    fn handle_intent_failed(&self, event: &StripeEvent) -> UseCaseResult<()> {
        let intent = StripeClient::extract_payment_intent(event).ok_or_else(|| {
            let err = BillingError::InvalidWebhook("missing payment intent object".to_string());
            warn!(
                status = err.status_code().as_u16(),
                "payments: failed event without payment intent object"
            );
            err
        })?;

        let invoice_id = intent
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get("invoice_id"))
            .cloned();
        let (error_code, error_message) = intent
            .last_payment_error
            .as_ref()
            .map(|err| (err.code.clone(), err.message.clone()))
            .unwrap_or((None, None));

        // Follow-up ledger behavior is the invoicing collaborator's call.
        warn!(
            transaction_id = %intent.id,
            invoice_id = ?invoice_id,
            error_code = ?error_code,
            error_message = ?error_message,
            "payments: gateway reported payment failure"
        );

        Ok(())
    }

    /// Client-asserted confirmation after the browser-side flow reports
    /// success. Never writes a journal row: only the webhook path carries a
    /// provider-issued transaction record.
    pub async fn confirm_payment(
        &self,
        user_id: i32,
        invoice_id: i32,
        transaction_id: &str,
    ) -> UseCaseResult<PaymentConfirmation> {
        if transaction_id.trim().is_empty() {
            let err = BillingError::Validation("transaction_id is required".to_string());
            warn!(
                %user_id,
                %invoice_id,
                status = err.status_code().as_u16(),
                "payments: confirmation missing transaction id"
            );
            return Err(err);
        }

        let invoice = self
            .invoice_repo
            .find_owned_by_id(invoice_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %invoice_id,
                    db_error = ?err,
                    "payments: failed to load invoice for confirmation"
                );
                BillingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BillingError::InvoiceNotFound;
                warn!(
                    %user_id,
                    %invoice_id,
                    status = err.status_code().as_u16(),
                    "payments: confirmation for missing or foreign invoice"
                );
                err
            })?;

        if InvoiceStatus::from_str(&invoice.status) == Some(InvoiceStatus::Paid) {
            info!(
                %user_id,
                %invoice_id,
                transaction_id,
                "payments: invoice already paid, webhook won the race"
            );
            return Ok(PaymentConfirmation::AlreadyPaid);
        }

        let updated = self
            .invoice_repo
            .mark_paid(invoice_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %invoice_id,
                    db_error = ?err,
                    "payments: conditional mark-paid failed"
                );
                BillingError::Internal(err)
            })?;

        info!(
            %user_id,
            %invoice_id,
            transaction_id,
            updated,
            "payments: client confirmation processed"
        );

        Ok(if updated {
            PaymentConfirmation::MarkedPaid
        } else {
            PaymentConfirmation::AlreadyPaid
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::domain::entities::{invoices::InvoiceEntity, payments::PaymentEntity};
    use crate::domain::repositories::{
        invoices::MockInvoiceRepository, payments::MockPaymentRepository,
    };
    use crate::domain::value_objects::billing::SettlementOutcome;
    use crate::payments::stripe_client::StripeEventData;

    fn sample_invoice(invoice_id: i32, user_id: i32, status: InvoiceStatus) -> InvoiceEntity {
        InvoiceEntity {
            invoice_id,
            user_id,
            vehicle_id: None,
            invoice_number: format!("INV-2026-{}", invoice_id),
            subtotal: Decimal::from_str("90.00").unwrap(),
            tax_amount: Decimal::from_str("10.00").unwrap(),
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::from_str("100.00").unwrap(),
            currency: None,
            status: status.to_string(),
            issued_at: Utc::now(),
            due_date: None,
            notes: None,
        }
    }

    fn sample_journal_entry(invoice_id: i32, transaction_id: &str) -> PaymentEntity {
        PaymentEntity {
            payment_id: 1,
            invoice_id,
            payment_method: GATEWAY_PAYMENT_METHOD.to_string(),
            amount: Decimal::from_str("100.00").unwrap(),
            paid_at: Utc::now(),
            transaction_id: transaction_id.to_string(),
            status: PaymentStatus::Completed.to_string(),
            notes: None,
        }
    }

    fn intent_event(type_: &str, transaction_id: &str, invoice_id: Option<i32>) -> StripeEvent {
        let mut object = serde_json::json!({
            "id": transaction_id,
            "amount_received": 10_000,
            "currency": "usd",
        });
        if let Some(invoice_id) = invoice_id {
            object["metadata"] = serde_json::json!({
                "invoice_id": invoice_id.to_string(),
                "user_id": "7",
            });
        }

        StripeEvent {
            id: Some("evt_1".to_string()),
            type_: type_.to_string(),
            created: None,
            livemode: None,
            data: StripeEventData { object },
        }
    }

    fn usecase(
        invoice_repo: MockInvoiceRepository,
        payment_repo: MockPaymentRepository,
        gateway: MockPaymentGateway,
    ) -> PaymentUseCase<MockInvoiceRepository, MockPaymentRepository, MockPaymentGateway> {
        PaymentUseCase::new(
            Arc::new(invoice_repo),
            Arc::new(payment_repo),
            Arc::new(gateway),
            "usd".to_string(),
        )
    }

    #[tokio::test]
    async fn create_intent_converts_amount_and_attaches_linkage_metadata() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        let invoice = sample_invoice(42, 7, InvoiceStatus::Unpaid);
        invoice_repo
            .expect_find_owned_by_id()
            .with(eq(42), eq(7))
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(Some(invoice)) })
            });

        gateway
            .expect_create_payment_intent()
            .withf(|amount_minor, currency, metadata| {
                *amount_minor == 10_000
                    && currency == "usd"
                    && metadata.get("invoice_id").map(String::as_str) == Some("42")
                    && metadata.get("user_id").map(String::as_str) == Some("7")
            })
            .returning(|_, _, _| {
                Box::pin(async {
                    Ok(CreatedPaymentIntent {
                        id: "pi_abc".to_string(),
                        client_secret: "pi_abc_secret_xyz".to_string(),
                    })
                })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let client_secret = usecase.create_payment_intent(7, 42).await.unwrap();
        assert_eq!(client_secret, "pi_abc_secret_xyz");
    }

    #[tokio::test]
    async fn create_intent_rejects_paid_invoice_without_calling_gateway() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        let invoice = sample_invoice(42, 7, InvoiceStatus::Paid);
        invoice_repo
            .expect_find_owned_by_id()
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(Some(invoice)) })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let err = usecase.create_payment_intent(7, 42).await.unwrap_err();
        assert!(matches!(err, BillingError::NotPayable(_)));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn create_intent_for_foreign_invoice_is_not_found() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        invoice_repo
            .expect_find_owned_by_id()
            .with(eq(42), eq(99))
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let err = usecase.create_payment_intent(99, 42).await.unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNotFound));
        assert_eq!(err.status_code().as_u16(), 404);
    }

    #[tokio::test]
    async fn webhook_succeeded_settles_invoice_and_journals_payment() {
        let invoice_repo = MockInvoiceRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(intent_event("payment_intent.succeeded", "pi_abc", Some(42))));

        payment_repo
            .expect_find_by_transaction_id()
            .with(eq("pi_abc"))
            .returning(|_| Box::pin(async { Ok(None) }));

        payment_repo
            .expect_settle_invoice()
            .withf(|payment| {
                payment.invoice_id == 42
                    && payment.transaction_id == "pi_abc"
                    && payment.amount == Decimal::from_str("100.00").unwrap()
                    && payment.status == "completed"
                    && payment.payment_method == "stripe"
            })
            .returning(|_| {
                Box::pin(async {
                    Ok(SettlementOutcome {
                        invoice_updated: true,
                        journal_recorded: true,
                    })
                })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_after_confirmation_win_still_journals_the_payment() {
        let invoice_repo = MockInvoiceRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(intent_event("payment_intent.succeeded", "pi_abc", Some(42))));

        payment_repo
            .expect_find_by_transaction_id()
            .with(eq("pi_abc"))
            .returning(|_| Box::pin(async { Ok(None) }));

        // The client confirmation already flipped the invoice to paid, so the
        // conditional update matches nothing; the journal row must still land.
        payment_repo
            .expect_settle_invoice()
            .withf(|payment| payment.invoice_id == 42 && payment.transaction_id == "pi_abc")
            .returning(|_| {
                Box::pin(async {
                    Ok(SettlementOutcome {
                        invoice_updated: false,
                        journal_recorded: true,
                    })
                })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_duplicate_delivery_is_acknowledged_without_settling() {
        let invoice_repo = MockInvoiceRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(intent_event("payment_intent.succeeded", "pi_abc", Some(42))));

        payment_repo
            .expect_find_by_transaction_id()
            .with(eq("pi_abc"))
            .returning(|_| {
                let existing = sample_journal_entry(42, "pi_abc");
                Box::pin(async move { Ok(Some(existing)) })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        // No settle_invoice expectation: a second call would panic the mock.
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected_without_side_effects() {
        let invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("invalid webhook signature")));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let err = usecase.handle_webhook(b"{}", "bad").await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidWebhook(_)));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn webhook_without_invoice_metadata_is_acknowledged() {
        let invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(intent_event("payment_intent.succeeded", "pi_abc", None)));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_payment_failed_is_acknowledged_without_ledger_writes() {
        let invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway.expect_verify_webhook_signature().returning(|_, _| {
            Ok(intent_event(
                "payment_intent.payment_failed",
                "pi_abc",
                Some(42),
            ))
        });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_unknown_event_type_is_ignored() {
        let invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(intent_event("charge.refunded", "ch_1", None)));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn confirmation_marks_unpaid_invoice_paid_without_journal_row() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        let invoice = sample_invoice(42, 7, InvoiceStatus::Unpaid);
        invoice_repo
            .expect_find_owned_by_id()
            .with(eq(42), eq(7))
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(Some(invoice)) })
            });

        invoice_repo
            .expect_mark_paid()
            .with(eq(42))
            .returning(|_| Box::pin(async { Ok(true) }));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        // payment_repo has no expectations: the confirmation path must never
        // write a journal row.
        let outcome = usecase.confirm_payment(7, 42, "pi_abc").await.unwrap();
        assert_eq!(outcome, PaymentConfirmation::MarkedPaid);
    }

    #[tokio::test]
    async fn confirmation_after_webhook_win_is_a_noop_success() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        let invoice = sample_invoice(42, 7, InvoiceStatus::Paid);
        invoice_repo
            .expect_find_owned_by_id()
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(Some(invoice)) })
            });

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let outcome = usecase.confirm_payment(7, 42, "pi_abc").await.unwrap();
        assert_eq!(outcome, PaymentConfirmation::AlreadyPaid);
    }

    #[tokio::test]
    async fn confirmation_requires_a_transaction_id() {
        let invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let err = usecase.confirm_payment(7, 42, "  ").await.unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn confirmation_for_foreign_invoice_is_not_found() {
        let mut invoice_repo = MockInvoiceRepository::new();
        let payment_repo = MockPaymentRepository::new();
        let gateway = MockPaymentGateway::new();

        invoice_repo
            .expect_find_owned_by_id()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = usecase(invoice_repo, payment_repo, gateway);

        let err = usecase.confirm_payment(99, 42, "pi_abc").await.unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNotFound));
    }
}
