use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::infrastructure::postgres::schema::invoice_items;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoice_items, primary_key(item_id))]
pub struct InvoiceItemEntity {
    pub item_id: i32,
    pub invoice_id: i32,
    pub service_id: Option<i32>,
    pub history_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoice_items)]
pub struct InsertInvoiceItemEntity {
    pub invoice_id: i32,
    pub service_id: Option<i32>,
    pub history_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
}
