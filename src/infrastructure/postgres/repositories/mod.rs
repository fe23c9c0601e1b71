pub mod invoices;
pub mod payments;
