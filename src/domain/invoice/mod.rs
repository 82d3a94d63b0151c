pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  Invoice, InvoiceLineItem, InvoicePeriod, InvoiceStatusSummary, InvoiceTerms, InvoiceTotals,
};
pub use errors::InvoiceError;
pub use ports::{InvoiceFilter, InvoiceRepository};
pub use services::{InvoiceOptions, InvoiceService, InvoicingDefaults, SelfInvoiceRequest};
pub use value_objects::{
  InvoiceId, InvoiceKind, InvoiceNumber, InvoiceStatus, PaymentTerms, TaxRate,
};
