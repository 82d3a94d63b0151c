use serde::{Deserialize, Serialize};

use crate::domain::shared::{Location, ValueObjectError};

/// Address fields as they arrive from a client
#[derive(Debug, Clone, Deserialize)]
pub struct LocationInput {
  pub address: String,
  pub city: String,
  pub postcode: String,
  pub country: Option<String>,
}

impl LocationInput {
  const DEFAULT_COUNTRY: &'static str = "GB";

  pub fn into_location(self) -> Result<Location, ValueObjectError> {
    Location::new(
      self.address,
      self.city,
      self.postcode,
      self
        .country
        .unwrap_or_else(|| Self::DEFAULT_COUNTRY.to_string()),
    )
  }
}

/// `{success, error?}` result for operations that report business-rule
/// failures as data rather than as errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl OperationOutcome {
  pub fn ok() -> Self {
    Self {
      success: true,
      error: None,
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      error: Some(error.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_location_input_defaults_country() {
    let location = LocationInput {
      address: "Unit 4, Wharf Road".to_string(),
      city: "Hull".to_string(),
      postcode: "hu1 2aa".to_string(),
      country: None,
    }
    .into_location()
    .unwrap();
    assert_eq!(location.country, "GB");
    assert_eq!(location.postcode, "HU1 2AA");
  }

  #[test]
  fn test_outcome_shape() {
    assert_eq!(
      serde_json::to_value(OperationOutcome::ok()).unwrap(),
      json!({"success": true})
    );
    assert_eq!(
      serde_json::to_value(OperationOutcome::failed("no POD")).unwrap(),
      json!({"success": false, "error": "no POD"})
    );
  }
}
