//! Flattens `validator` results into a field-path → messages map.

use serde::Serialize;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validation failures keyed by dotted field path (`pickup.postcode`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.0.entry(field.into()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  /// First message in field order; what a client shows when it can only
  /// show one thing
  pub fn first_message(&self) -> Option<&str> {
    self
      .0
      .values()
      .flat_map(|messages| messages.iter())
      .map(String::as_str)
      .next()
  }

  fn collect(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
    for (field, kind) in errors.errors() {
      let path = match prefix {
        Some(prefix) => format!("{}.{}", prefix, field),
        None => field.to_string(),
      };
      match kind {
        ValidationErrorsKind::Field(field_errors) => {
          for error in field_errors {
            self.add(path.clone(), describe(&path, error));
          }
        }
        ValidationErrorsKind::Struct(nested) => self.collect(Some(&path), nested),
        ValidationErrorsKind::List(items) => {
          for (index, nested) in items {
            self.collect(Some(&format!("{}[{}]", path, index)), nested);
          }
        }
      }
    }
  }
}

impl From<&ValidationErrors> for FieldErrors {
  fn from(errors: &ValidationErrors) -> Self {
    let mut field_errors = FieldErrors::new();
    field_errors.collect(None, errors);
    field_errors
  }
}

fn describe(path: &str, error: &ValidationError) -> String {
  match &error.message {
    Some(message) => message.to_string(),
    None => format!("{} is invalid ({})", path, error.code),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use validator::Validate;

  #[derive(Debug, Validate)]
  struct Address {
    #[validate(length(min = 1, message = "City is required"))]
    city: String,
    #[validate(length(min = 5, max = 8))]
    postcode: String,
  }

  #[derive(Debug, Validate)]
  struct Shipment {
    #[validate(length(min = 1, message = "Reference is required"))]
    reference: String,
    #[validate(nested)]
    pickup: Address,
  }

  #[test]
  fn test_nested_errors_use_dotted_paths() {
    let shipment = Shipment {
      reference: String::new(),
      pickup: Address {
        city: String::new(),
        postcode: "X".to_string(),
      },
    };
    let errors = FieldErrors::from(&shipment.validate().unwrap_err());

    assert_eq!(errors.get("reference").unwrap(), ["Reference is required"]);
    assert_eq!(errors.get("pickup.city").unwrap(), ["City is required"]);
    assert_eq!(
      errors.get("pickup.postcode").unwrap(),
      ["pickup.postcode is invalid (length)"]
    );
    assert_eq!(errors.first_message(), Some("City is required"));
  }

  #[test]
  fn test_valid_input_has_no_errors() {
    let shipment = Shipment {
      reference: "JOB-1".to_string(),
      pickup: Address {
        city: "York".to_string(),
        postcode: "YO1 7HH".to_string(),
      },
    };
    assert!(shipment.validate().is_ok());
    assert!(FieldErrors::new().is_empty());
  }
}
