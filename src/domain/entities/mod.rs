pub mod invoice_items;
pub mod invoices;
pub mod payments;
