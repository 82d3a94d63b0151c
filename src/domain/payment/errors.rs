use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
  #[error("Payment processing is not configured")]
  NotConfigured,

  #[error("Payment processor rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("Payment processor unavailable: {0}")]
  Unavailable(String),

  #[error("Unexpected payment processor response: {0}")]
  InvalidResponse(String),
}

impl PaymentError {
  /// Worth another attempt: transport failures and 5xx/429 answers
  pub fn is_transient(&self) -> bool {
    match self {
      PaymentError::Unavailable(_) => true,
      PaymentError::Rejected { status, .. } => *status >= 500 || *status == 429,
      _ => false,
    }
  }
}
