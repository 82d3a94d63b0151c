use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid identifier: {0}")]
  InvalidIdentifier(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid location: {0}")]
  InvalidLocation(String),
  #[error("Invalid job reference: {0}")]
  InvalidReference(String),
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Invalid priority: {0}")]
  InvalidPriority(String),
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid payment terms: {0}")]
  InvalidPaymentTerms(String),
  #[error("Invalid company name: {0}")]
  InvalidCompanyName(String),
  #[error("Invalid company type: {0}")]
  InvalidCompanyType(String),
  #[error("Invalid contact details: {0}")]
  InvalidContact(String),
}

// Currency - ISO 4217
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
  #[default]
  GBP,
  EUR,
  USD,
}

impl Currency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::GBP => "GBP",
      Currency::EUR => "EUR",
      Currency::USD => "USD",
    }
  }

  pub fn symbol(&self) -> &'static str {
    match self {
      Currency::GBP => "£",
      Currency::EUR => "€",
      Currency::USD => "$",
    }
  }
}

impl FromStr for Currency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "GBP" => Ok(Currency::GBP),
      "EUR" => Ok(Currency::EUR),
      "USD" => Ok(Currency::USD),
      _ => Err(ValueObjectError::InvalidCurrency(format!(
        "Unsupported currency: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for Currency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Money - Amount with currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
  pub amount: Decimal,
  pub currency: Currency,
}

impl Money {
  pub fn new(amount: Decimal, currency: Currency) -> Result<Self, ValueObjectError> {
    if amount.is_sign_negative() {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot be negative".to_string(),
      ));
    }
    if amount.scale() > 2 {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot have more than 2 decimal places".to_string(),
      ));
    }
    Ok(Self { amount, currency })
  }

  pub fn gbp(amount: Decimal) -> Result<Self, ValueObjectError> {
    Self::new(amount, Currency::GBP)
  }

  pub fn zero(currency: Currency) -> Self {
    Self {
      amount: Decimal::ZERO,
      currency,
    }
  }

  pub fn add(&self, other: &Money) -> Result<Money, ValueObjectError> {
    if self.currency != other.currency {
      return Err(ValueObjectError::InvalidAmount(format!(
        "Cannot add {} to {}",
        other.currency, self.currency
      )));
    }
    Ok(Money {
      amount: self.amount + other.amount,
      currency: self.currency,
    })
  }

  /// Multiplies and rounds half away from zero to whole pence/cents
  pub fn multiply(&self, factor: Decimal) -> Money {
    Money {
      amount: (self.amount * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
      currency: self.currency,
    }
  }

  /// Amount in minor units (pence, cents)
  pub fn minor_units(&self) -> Result<i64, ValueObjectError> {
    let scaled = (self.amount * Decimal::ONE_HUNDRED).round();
    i64::try_from(scaled)
      .map_err(|_| ValueObjectError::InvalidAmount(format!("{} is out of range", self.amount)))
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
  }
}

// Location - pickup/delivery point or a company's postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub address: String,
  pub city: String,
  pub postcode: String,
  pub country: String,
}

impl Location {
  pub fn new(
    address: String,
    city: String,
    postcode: String,
    country: String,
  ) -> Result<Self, ValueObjectError> {
    let address = address.trim().to_string();
    let city = city.trim().to_string();
    let postcode = postcode.trim().to_uppercase();
    let country = country.trim().to_uppercase();

    if address.is_empty() {
      return Err(ValueObjectError::InvalidLocation(
        "Address cannot be empty".to_string(),
      ));
    }
    if city.is_empty() {
      return Err(ValueObjectError::InvalidLocation(
        "City cannot be empty".to_string(),
      ));
    }
    if postcode.is_empty() || postcode.len() > 16 {
      return Err(ValueObjectError::InvalidLocation(
        "Postcode must be between 1 and 16 characters".to_string(),
      ));
    }
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(ValueObjectError::InvalidLocation(format!(
        "Country must be a two-letter ISO code, got '{}'",
        country
      )));
    }

    Ok(Self {
      address,
      city,
      postcode,
      country,
    })
  }

  pub fn format_single_line(&self) -> String {
    format!(
      "{}, {} {}, {}",
      self.address, self.city, self.postcode, self.country
    )
  }
}
