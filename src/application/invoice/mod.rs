pub mod change_invoice_status;
pub mod create_invoice_from_job;
pub mod create_payment_intent;
pub mod create_self_invoice;
pub mod invoice_dto;
pub mod list_invoices;
pub mod mark_overdue_invoices;

pub use change_invoice_status::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusResponse, ChangeInvoiceStatusUseCase,
};
pub use create_invoice_from_job::{
  CreateInvoiceFromJobCommand, CreateInvoiceFromJobUseCase, InvoiceOutcome,
};
pub use create_payment_intent::{
  CreatePaymentIntentUseCase, PaymentIntentError, PaymentIntentResponse,
};
pub use create_self_invoice::{CreateSelfInvoiceCommand, CreateSelfInvoiceUseCase};
pub use invoice_dto::{InvoiceDto, InvoiceLineItemDto, InvoiceSummaryDto};
pub use list_invoices::{
  GetInvoiceSummaryUseCase, GetInvoiceUseCase, InvoiceSummaryResponse, ListInvoicesCommand,
  ListInvoicesResponse, ListInvoicesUseCase,
};
pub use mark_overdue_invoices::{MarkOverdueInvoicesUseCase, MarkOverdueResponse};
