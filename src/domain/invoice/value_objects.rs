use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::job::value_objects::JobReference;
use crate::domain::shared::ValueObjectError;
use crate::domain::shared::ids::prefixed_id;

prefixed_id!(
  /// Invoice identifier (`invoice_…`)
  InvoiceId,
  "invoice_"
);

// Invoice Number - human facing, unique across invoices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  /// `INV-<job reference>`
  pub fn for_job(reference: &JobReference) -> Self {
    Self(format!("INV-{}", reference.value()))
  }

  /// `SI-<yyyymm>-<8 hex digits>` for carrier self-invoices
  pub fn for_self_invoice(period_end: NaiveDate) -> Self {
    let suffix: u32 = rand::thread_rng().r#gen();
    Self(format!("SI-{}-{:08X}", period_end.format("%Y%m"), suffix))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Paid,
  Overdue,
}

impl InvoiceStatus {
  pub const ALL: [InvoiceStatus; 4] = [
    InvoiceStatus::Draft,
    InvoiceStatus::Sent,
    InvoiceStatus::Paid,
    InvoiceStatus::Overdue,
  ];

  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    matches!(
      (self, new_status),
      (InvoiceStatus::Draft, InvoiceStatus::Sent)
        | (InvoiceStatus::Sent, InvoiceStatus::Paid)
        | (InvoiceStatus::Sent, InvoiceStatus::Overdue)
        | (InvoiceStatus::Overdue, InvoiceStatus::Paid)
    )
  }

  /// Money is still owed on the invoice
  pub fn is_outstanding(&self) -> bool {
    matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Sent => "sent",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "sent" => Ok(InvoiceStatus::Sent),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown invoice status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Who the invoice is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
  /// Bills a customer for one job
  Customer,
  /// Pays a carrier for several jobs over a period
  CarrierSelfInvoice,
}

impl InvoiceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceKind::Customer => "customer",
      InvoiceKind::CarrierSelfInvoice => "carrier_self_invoice",
    }
  }
}

impl FromStr for InvoiceKind {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "customer" => Ok(InvoiceKind::Customer),
      "carrier_self_invoice" => Ok(InvoiceKind::CarrierSelfInvoice),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown invoice kind: {}",
        s
      ))),
    }
  }
}

// Payment terms in days after the invoice date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms(u32);

impl PaymentTerms {
  const MAX_DAYS: u32 = 365;

  pub fn new(days: u32) -> Result<Self, ValueObjectError> {
    if days > Self::MAX_DAYS {
      return Err(ValueObjectError::InvalidPaymentTerms(format!(
        "Payment terms cannot exceed {} days",
        Self::MAX_DAYS
      )));
    }
    Ok(Self(days))
  }

  pub fn days(&self) -> u32 {
    self.0
  }
}

impl fmt::Display for PaymentTerms {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0 {
      0 => write!(f, "Due on Receipt"),
      days => write!(f, "Net {}", days),
    }
  }
}

/// Tax rate as a fraction (0.20 for 20%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate must be between 0 and 1".to_string(),
      ));
    }
    if value.scale() > 4 {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate cannot have more than 4 decimal places".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  /// From a whole or fractional percentage (20 → 0.20)
  pub fn from_percentage(percent: Decimal) -> Result<Self, ValueObjectError> {
    Self::new(percent / Decimal::ONE_HUNDRED)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_invoice_status_transitions() {
    assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
    assert!(!InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Paid));

    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Paid));
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Overdue));
    assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));

    assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Sent));
    assert!(!InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Draft));
  }

  #[test]
  fn test_invoice_status_parse() {
    assert_eq!(InvoiceStatus::from_str("PAID").unwrap(), InvoiceStatus::Paid);
    assert!(InvoiceStatus::from_str("cancelled").is_err());
  }

  #[test]
  fn test_invoice_numbers() {
    let reference = JobReference::new("job-261018-00ff").unwrap();
    assert_eq!(InvoiceNumber::for_job(&reference).value(), "INV-JOB-261018-00FF");

    let number = InvoiceNumber::for_self_invoice(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
    assert!(number.value().starts_with("SI-202609-"));
    assert_eq!(number.value().len(), "SI-202609-".len() + 8);
    assert!(InvoiceNumber::new("  ".to_string()).is_err());
  }

  #[test]
  fn test_tax_rate() {
    assert_eq!(TaxRate::from_percentage(dec!(20)).unwrap().value(), dec!(0.20));
    assert!(TaxRate::new(dec!(1.5)).is_err());
    assert!(TaxRate::new(dec!(-0.1)).is_err());
  }

  #[test]
  fn test_payment_terms() {
    assert_eq!(PaymentTerms::new(30).unwrap().days(), 30);
    assert_eq!(PaymentTerms::new(0).unwrap().to_string(), "Due on Receipt");
    assert!(PaymentTerms::new(400).is_err());
  }
}
