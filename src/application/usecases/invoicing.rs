use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::application::usecases::{BillingError, UseCaseResult};
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::value_objects::{
    billing::{
        CreateInvoiceModel, CreatedInvoice, InvoiceDetailDto, InvoiceSummaryDto, NewInvoice,
        NewInvoiceItem,
    },
    enums::invoice_statuses::InvoiceStatus,
};

pub struct InvoiceUseCase<Inv>
where
    Inv: InvoiceRepository + Send + Sync + 'static,
{
    invoice_repo: Arc<Inv>,
}

impl<Inv> InvoiceUseCase<Inv>
where
    Inv: InvoiceRepository + Send + Sync + 'static,
{
    pub fn new(invoice_repo: Arc<Inv>) -> Self {
        Self { invoice_repo }
    }

    /// Creates an invoice with its line items. Item totals and the invoice
    /// total are computed here; the repository assigns the invoice number.
    pub async fn create_invoice(
        &self,
        user_id: i32,
        model: CreateInvoiceModel,
    ) -> UseCaseResult<CreatedInvoice> {
        if model.items.is_empty() {
            let err = BillingError::Validation("invoice requires at least one item".to_string());
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "invoicing: create rejected, no items"
            );
            return Err(err);
        }

        let mut items = Vec::with_capacity(model.items.len());
        for item in &model.items {
            if item.quantity <= 0 {
                let err =
                    BillingError::Validation("item quantity must be positive".to_string());
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "invoicing: create rejected, non-positive quantity"
                );
                return Err(err);
            }
            if item.unit_price < Decimal::ZERO {
                let err =
                    BillingError::Validation("item unit price must not be negative".to_string());
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "invoicing: create rejected, negative unit price"
                );
                return Err(err);
            }

            let discount = item.discount.unwrap_or(Decimal::ZERO);
            let total_price = item.unit_price * Decimal::from(item.quantity) - discount;

            items.push(NewInvoiceItem {
                service_id: item.service_id,
                history_id: item.history_id,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount,
                total_price,
            });
        }

        let subtotal: Decimal = items.iter().map(|item| item.total_price).sum();
        let tax_amount = model.tax_amount.unwrap_or(Decimal::ZERO);
        let discount_amount = model.discount_amount.unwrap_or(Decimal::ZERO);
        let total_amount = subtotal + tax_amount - discount_amount;

        let created = self
            .invoice_repo
            .create_invoice(
                NewInvoice {
                    user_id,
                    vehicle_id: model.vehicle_id,
                    subtotal,
                    tax_amount,
                    discount_amount,
                    total_amount,
                    currency: model.currency,
                    status: InvoiceStatus::Unpaid.to_string(),
                    due_date: model.due_date,
                    notes: model.notes,
                },
                items,
            )
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "invoicing: failed to create invoice");
                BillingError::Internal(err)
            })?;

        info!(
            %user_id,
            invoice_id = created.invoice_id,
            invoice_number = %created.invoice_number,
            total_amount = %total_amount,
            "invoicing: invoice created"
        );

        Ok(created)
    }

    pub async fn list_invoices(&self, user_id: i32) -> UseCaseResult<Vec<InvoiceSummaryDto>> {
        let invoices = self.invoice_repo.list_by_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "invoicing: failed to list invoices");
            BillingError::Internal(err)
        })?;

        Ok(invoices.into_iter().map(InvoiceSummaryDto::from).collect())
    }

    pub async fn get_invoice(
        &self,
        user_id: i32,
        invoice_id: i32,
    ) -> UseCaseResult<InvoiceDetailDto> {
        let invoice = self
            .invoice_repo
            .find_owned_by_id(invoice_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, %invoice_id, db_error = ?err, "invoicing: failed to load invoice");
                BillingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BillingError::InvoiceNotFound;
                warn!(
                    %user_id,
                    %invoice_id,
                    status = err.status_code().as_u16(),
                    "invoicing: invoice missing or not owned by caller"
                );
                err
            })?;

        let items = self
            .invoice_repo
            .list_items(invoice_id)
            .await
            .map_err(|err| {
                error!(%user_id, %invoice_id, db_error = ?err, "invoicing: failed to load items");
                BillingError::Internal(err)
            })?;

        Ok(InvoiceDetailDto::from_parts(invoice, items))
    }

    /// Total of all paid invoices, for the admin dashboard.
    pub async fn revenue_summary(&self) -> UseCaseResult<Decimal> {
        let total = self.invoice_repo.sum_paid_revenue().await.map_err(|err| {
            error!(db_error = ?err, "invoicing: failed to sum paid revenue");
            BillingError::Internal(err)
        })?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::str::FromStr;

    use crate::domain::repositories::invoices::MockInvoiceRepository;
    use crate::domain::value_objects::billing::CreateInvoiceItemModel;

    fn item(description: &str, quantity: i32, unit_price: &str, discount: Option<&str>) -> CreateInvoiceItemModel {
        CreateInvoiceItemModel {
            service_id: None,
            history_id: None,
            description: description.to_string(),
            quantity,
            unit_price: Decimal::from_str(unit_price).unwrap(),
            discount: discount.map(|value| Decimal::from_str(value).unwrap()),
        }
    }

    #[tokio::test]
    async fn create_invoice_computes_totals_and_passes_draft_to_repository() {
        let mut invoice_repo = MockInvoiceRepository::new();

        invoice_repo
            .expect_create_invoice()
            .withf(|invoice, items| {
                invoice.user_id == 7
                    && invoice.status == "unpaid"
                    && invoice.subtotal == Decimal::from_str("85.00").unwrap()
                    && invoice.tax_amount == Decimal::from_str("8.50").unwrap()
                    && invoice.total_amount == Decimal::from_str("93.50").unwrap()
                    && items.len() == 2
                    && items[0].total_price == Decimal::from_str("60.00").unwrap()
                    && items[1].total_price == Decimal::from_str("25.00").unwrap()
            })
            .returning(|_, _| {
                Box::pin(async {
                    Ok(CreatedInvoice {
                        invoice_id: 42,
                        invoice_number: "INV-2026-1".to_string(),
                    })
                })
            });

        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo));

        let created = usecase
            .create_invoice(
                7,
                CreateInvoiceModel {
                    vehicle_id: None,
                    items: vec![
                        item("Oil change", 2, "30.00", None),
                        item("Brake inspection", 1, "30.00", Some("5.00")),
                    ],
                    tax_amount: Some(Decimal::from_str("8.50").unwrap()),
                    discount_amount: None,
                    currency: None,
                    due_date: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.invoice_id, 42);
        assert_eq!(created.invoice_number, "INV-2026-1");
    }

    #[tokio::test]
    async fn create_invoice_rejects_empty_item_list() {
        let invoice_repo = MockInvoiceRepository::new();
        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo));

        let err = usecase
            .create_invoice(
                7,
                CreateInvoiceModel {
                    vehicle_id: None,
                    items: vec![],
                    tax_amount: None,
                    discount_amount: None,
                    currency: None,
                    due_date: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_invoice_rejects_non_positive_quantity() {
        let invoice_repo = MockInvoiceRepository::new();
        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo));

        let err = usecase
            .create_invoice(
                7,
                CreateInvoiceModel {
                    vehicle_id: None,
                    items: vec![item("Nothing", 0, "10.00", None)],
                    tax_amount: None,
                    discount_amount: None,
                    currency: None,
                    due_date: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn get_invoice_for_foreign_user_is_not_found() {
        let mut invoice_repo = MockInvoiceRepository::new();

        invoice_repo
            .expect_find_owned_by_id()
            .with(eq(42), eq(99))
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo));

        let err = usecase.get_invoice(99, 42).await.unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNotFound));
    }

    #[tokio::test]
    async fn revenue_summary_defaults_to_zero() {
        let mut invoice_repo = MockInvoiceRepository::new();

        invoice_repo
            .expect_sum_paid_revenue()
            .returning(|| Box::pin(async { Ok(Decimal::ZERO) }));

        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo));

        let total = usecase.revenue_summary().await.unwrap();
        assert_eq!(total, Decimal::ZERO);
    }
}
