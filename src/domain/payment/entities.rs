use serde::{Deserialize, Serialize};

use crate::domain::invoice::entities::Invoice;
use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::value_objects::InvoiceId;
use crate::domain::shared::Currency;

/// Body sent to the payment processor. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentRequest {
  pub invoice_id: InvoiceId,
  pub amount: i64,
  pub currency: Currency,
  pub customer: String,
  pub description: String,
}

impl PaymentIntentRequest {
  /// Requests payment of an outstanding customer invoice's total
  pub fn for_invoice(invoice: &Invoice, customer: String) -> Result<Self, InvoiceError> {
    if !invoice.can_accept_payment() {
      return Err(InvoiceError::NotPayable(invoice.id.clone()));
    }
    Ok(Self {
      invoice_id: invoice.id.clone(),
      amount: invoice.total.minor_units()?,
      currency: invoice.currency,
      customer,
      description: format!("Invoice {}", invoice.invoice_number),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
  pub client_secret: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::company::value_objects::{CompanyId, CompanyType};
  use crate::domain::invoice::entities::InvoiceTerms;
  use crate::domain::invoice::value_objects::{InvoiceStatus, PaymentTerms, TaxRate};
  use crate::domain::job::entities::{Job, tests::new_job};
  use chrono::NaiveDate;
  use rust_decimal_macros::dec;

  fn invoice() -> Invoice {
    let mut job = Job::new(new_job()).unwrap();
    job.customer_id = Some(CompanyId::generate(CompanyType::Customer));
    Invoice::from_job(
      &job,
      InvoiceTerms {
        tax_rate: TaxRate::new(dec!(0.20)).unwrap(),
        payment_terms: PaymentTerms::new(30).unwrap(),
        invoice_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
      },
    )
    .unwrap()
  }

  #[test]
  fn test_request_uses_minor_units() {
    let mut invoice = invoice();
    invoice.change_status(InvoiceStatus::Sent).unwrap();

    let request = PaymentIntentRequest::for_invoice(&invoice, "Acme Retail".to_string()).unwrap();
    assert_eq!(request.amount, 120_000);
    assert_eq!(request.currency, Currency::GBP);
    assert!(request.description.starts_with("Invoice INV-"));
  }

  #[test]
  fn test_draft_invoice_is_not_payable() {
    let result = PaymentIntentRequest::for_invoice(&invoice(), "Acme Retail".to_string());
    assert!(matches!(result, Err(InvoiceError::NotPayable(_))));
  }
}
